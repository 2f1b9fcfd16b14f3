use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use tracing::warn;

use crate::auth::claims::SessionClaims;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;

/// Perimeter guard: routes are protected by declaring this extractor; routes
/// without it are public. Fails closed before any handler logic runs.
pub struct AuthSession(pub SessionClaims);

pub fn verify_bearer(keys: &JwtKeys, headers: &HeaderMap) -> Result<SessionClaims, ApiError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .ok_or(ApiError::Unauthorized)?;

    keys.verify(token).map_err(|_| {
        warn!("invalid or expired token");
        ApiError::Unauthorized
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let claims = verify_bearer(&keys, &parts.headers)?;
        Ok(AuthSession(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::SessionKind;
    use crate::state::AppState;
    use axum::http::header::AUTHORIZATION;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    fn signed_token(keys: &JwtKeys) -> String {
        let now = OffsetDateTime::now_utc();
        let expired_at = now + keys.anonymous_ttl;
        let claims = SessionClaims {
            id: Uuid::new_v4(),
            kind: SessionKind::Anonymous,
            user_id: None,
            user: None,
            seed: Some("empty".into()),
            expired_at,
            exp: expired_at.unix_timestamp() as usize,
            iat: now.unix_timestamp() as usize,
        };
        keys.sign(&claims).unwrap()
    }

    #[tokio::test]
    async fn accepts_a_valid_bearer_token() {
        let keys = keys();
        let token = signed_token(&keys);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        let claims = verify_bearer(&keys, &headers).expect("valid bearer");
        assert_eq!(claims.kind, SessionKind::Anonymous);
    }

    #[tokio::test]
    async fn rejects_missing_header_and_bad_scheme() {
        let keys = keys();
        let headers = HeaderMap::new();
        assert!(verify_bearer(&keys, &headers).is_err());

        let token = signed_token(&keys);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Basic {}", token).parse().unwrap());
        assert!(verify_bearer(&keys, &headers).is_err());
    }

    #[tokio::test]
    async fn rejects_a_tampered_token() {
        let keys = keys();
        let mut token = signed_token(&keys);
        token.push('x');
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        assert!(verify_bearer(&keys, &headers).is_err());
    }
}
