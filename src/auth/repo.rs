use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Session, SessionKind};

impl Session {
    /// Persist a freshly issued session. The id is generated by the service,
    /// not the database, because it is also embedded in the signed token.
    pub async fn create(
        db: &PgPool,
        id: Uuid,
        user_id: Option<Uuid>,
        kind: SessionKind,
        jwt: &str,
        expired_at: OffsetDateTime,
    ) -> anyhow::Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, kind, jwt, expired_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, kind, jwt, expired_at, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(kind)
        .bind(jwt)
        .bind(expired_at)
        .fetch_one(db)
        .await?;
        Ok(session)
    }
}
