use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Whether a session was granted against credentials or anonymously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SessionKind {
    Auth,
    Anonymous,
}

/// A single issued authentication grant. Rows are never mutated; expiry is
/// enforced at token verification, not by deleting rows.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub kind: SessionKind,
    pub jwt: String,
    pub expired_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}
