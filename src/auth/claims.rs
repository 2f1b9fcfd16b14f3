use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::SessionKind;
use crate::users::repo_types::PublicUser;

/// Payload signed into a session bearer token.
///
/// `expired_at` mirrors `exp` so the client can read the expiry without
/// decoding unix timestamps; both always equal the persisted session row's
/// `expired_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub id: Uuid, // session id
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub expired_at: OffsetDateTime,
    pub exp: usize,
    pub iat: usize,
}
