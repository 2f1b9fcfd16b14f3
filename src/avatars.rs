use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;

use crate::storage::StorageClient;

/// Placeholder avatar every account starts with. The object itself is shared
/// and must never be deleted from the bucket.
pub const DEFAULT_AVATAR: &str = "default-avatar.png";

pub struct AvatarUpload {
    pub body: Bytes,
    pub content_type: String,
}

/// Derives the storage key for a fresh avatar: `{username}-{millis}.{ext}`.
pub fn avatar_key(username: &str, content_type: &str, now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    format!("{}-{}.{}", username, millis, ext)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

pub async fn upload_avatar(
    storage: &dyn StorageClient,
    username: &str,
    file: AvatarUpload,
) -> anyhow::Result<String> {
    let key = avatar_key(username, &file.content_type, OffsetDateTime::now_utc());
    storage
        .put_object(&key, file.body, &file.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(key)
}

/// Uploads the new avatar first, then removes the old object. The old key is
/// only deleted once the new upload has succeeded.
pub async fn replace_avatar(
    storage: &dyn StorageClient,
    username: &str,
    old_key: &str,
    file: AvatarUpload,
) -> anyhow::Result<String> {
    let key = upload_avatar(storage, username, file).await?;
    delete_avatar(storage, old_key).await?;
    Ok(key)
}

/// No-op for the shared placeholder key.
pub async fn delete_avatar(storage: &dyn StorageClient, key: &str) -> anyhow::Result<()> {
    if key == DEFAULT_AVATAR {
        return Ok(());
    }
    storage
        .delete_object(key)
        .await
        .with_context(|| format!("delete_object {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStorage {
        puts: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl CountingStorage {
        fn new() -> Self {
            Self {
                puts: AtomicUsize::new(0),
                deletes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StorageClient for CountingStorage {
        async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn delete_object(&self, _k: &str) -> anyhow::Result<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn key_is_username_millis_and_extension() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let key = avatar_key("alice123", "image/png", now);
        assert_eq!(key, "alice123-1700000000000.png");

        let key = avatar_key("bob-_1", "application/octet-stream", now);
        assert_eq!(key, "bob-_1-1700000000000.bin");
    }

    #[tokio::test]
    async fn delete_skips_the_default_avatar() {
        let storage = CountingStorage::new();
        delete_avatar(&storage, DEFAULT_AVATAR).await.unwrap();
        assert_eq!(storage.deletes.load(Ordering::SeqCst), 0);

        delete_avatar(&storage, "alice123-1700000000000.png")
            .await
            .unwrap();
        assert_eq!(storage.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn replace_uploads_then_deletes_old() {
        let storage = CountingStorage::new();
        let key = replace_avatar(
            &storage,
            "alice123",
            "alice123-1.png",
            AvatarUpload {
                body: Bytes::from_static(b"img"),
                content_type: "image/png".into(),
            },
        )
        .await
        .unwrap();
        assert!(key.starts_with("alice123-"));
        assert!(key.ends_with(".png"));
        assert_eq!(storage.puts.load(Ordering::SeqCst), 1);
        assert_eq!(storage.deletes.load(Ordering::SeqCst), 1);
    }
}
