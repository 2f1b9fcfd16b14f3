use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::Duration as TimeDuration;
use tracing::debug;

use crate::auth::claims::SessionClaims;
use crate::auth::repo_types::SessionKind;
use crate::config::JwtConfig;
use crate::state::AppState;

/// Shared-secret signer/verifier plus the session-duration policy constants.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub auth_ttl: TimeDuration,
    pub anonymous_ttl: TimeDuration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            auth_session_hours,
            anonymous_session_hours,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            auth_ttl: TimeDuration::hours(auth_session_hours),
            anonymous_ttl: TimeDuration::hours(anonymous_session_hours),
        }
    }
}

impl JwtKeys {
    pub fn ttl_for(&self, kind: SessionKind) -> TimeDuration {
        match kind {
            SessionKind::Auth => self.auth_ttl,
            SessionKind::Anonymous => self.anonymous_ttl,
        }
    }

    pub fn sign(&self, claims: &SessionClaims) -> anyhow::Result<String> {
        let token = encode(&Header::default(), claims, &self.encoding)?;
        debug!(session_id = %claims.id, kind = ?claims.kind, "session token signed");
        Ok(token)
    }

    /// Rejects bad signatures and tokens whose embedded expiry has passed,
    /// regardless of what the sessions table still holds.
    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())?;
        debug!(session_id = %data.claims.id, kind = ?data.claims.kind, "session token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    fn claims(kind: SessionKind, expired_at: OffsetDateTime) -> SessionClaims {
        SessionClaims {
            id: Uuid::new_v4(),
            kind,
            user_id: match kind {
                SessionKind::Auth => Some(Uuid::new_v4()),
                SessionKind::Anonymous => None,
            },
            user: None,
            seed: None,
            expired_at,
            exp: expired_at.unix_timestamp() as usize,
            iat: OffsetDateTime::now_utc().unix_timestamp() as usize,
        }
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let expired_at = OffsetDateTime::now_utc() + keys.auth_ttl;
        let claims = claims(SessionKind::Auth, expired_at);
        let token = keys.sign(&claims).expect("sign");
        let decoded = keys.verify(&token).expect("verify");
        assert_eq!(decoded.id, claims.id);
        assert_eq!(decoded.kind, SessionKind::Auth);
        assert_eq!(decoded.user_id, claims.user_id);
        assert_eq!(
            decoded.expired_at.unix_timestamp(),
            expired_at.unix_timestamp()
        );
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = make_keys();
        let expired_at = OffsetDateTime::now_utc() - TimeDuration::hours(1);
        let token = keys.sign(&claims(SessionKind::Anonymous, expired_at)).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_foreign_secret() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"other"),
            decoding: DecodingKey::from_secret(b"other"),
            auth_ttl: keys.auth_ttl,
            anonymous_ttl: keys.anonymous_ttl,
        };
        let expired_at = OffsetDateTime::now_utc() + keys.auth_ttl;
        let token = other.sign(&claims(SessionKind::Auth, expired_at)).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn anonymous_sessions_expire_before_authenticated_ones() {
        let keys = make_keys();
        assert!(keys.ttl_for(SessionKind::Anonymous) < keys.ttl_for(SessionKind::Auth));
    }
}
