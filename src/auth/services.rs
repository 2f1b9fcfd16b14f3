use axum::extract::FromRef;
use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::claims::SessionClaims;
use crate::auth::dto::{
    AnonymousLoginRequest, AnonymousLoginResponse, LoginRequest, LoginResponse, RegisterRequest,
};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::{Session, SessionKind};
use crate::avatars::{self, AvatarUpload, DEFAULT_AVATAR};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::NewUser;
use crate::users::repo_types::{PublicUser, User};

pub(crate) fn is_unique_violation(e: &anyhow::Error) -> bool {
    e.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map_or(false, |db| db.is_unique_violation())
}

pub async fn register(
    state: &AppState,
    req: RegisterRequest,
    file: Option<AvatarUpload>,
) -> Result<PublicUser, ApiError> {
    req.validate()?;

    if User::find_by_email_or_username(&state.db, &req.email, &req.username)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        warn!(username = %req.username, "registration rejected, username or email taken");
        return Err(ApiError::UsernameOrEmailExists);
    }

    // Uniqueness is checked first so a doomed registration never uploads.
    let avatar = match file {
        Some(file) => avatars::upload_avatar(state.storage.as_ref(), &req.username, file)
            .await
            .map_err(ApiError::Internal)?,
        None => DEFAULT_AVATAR.to_string(),
    };

    let password_hash = hash_password(&req.password).map_err(ApiError::Internal)?;

    let created = User::create(
        &state.db,
        NewUser {
            username: &req.username,
            email: &req.email,
            password_hash: &password_hash,
            first_name: req.first_name.as_deref(),
            last_name: req.last_name.as_deref(),
            avatar: &avatar,
            birthdate: req.birthdate,
            gender: req.gender,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            // a concurrent registration won the race at the store
            ApiError::UsernameOrEmailExists
        } else {
            ApiError::Internal(e)
        }
    })?;

    info!(user_id = %created.id, username = %created.username, "user registered");
    Ok(created.into())
}

pub async fn login(state: &AppState, req: LoginRequest) -> Result<LoginResponse, ApiError> {
    let login_id = req.login_id.trim();

    let user = User::find_by_login_id(&state.db, login_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::UserNotFound)?;

    if !verify_password(&req.password, &user.password_hash).map_err(ApiError::Internal)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(state);
    let session_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    let expired_at = now + keys.ttl_for(SessionKind::Auth);

    let user_id = user.id;
    let public: PublicUser = user.into();

    // The signed expiry and the persisted expiry must be the same instant.
    let claims = SessionClaims {
        id: session_id,
        kind: SessionKind::Auth,
        user_id: Some(user_id),
        user: Some(public.clone()),
        seed: None,
        expired_at,
        exp: expired_at.unix_timestamp() as usize,
        iat: now.unix_timestamp() as usize,
    };
    let token = keys.sign(&claims).map_err(ApiError::Internal)?;

    Session::create(
        &state.db,
        session_id,
        Some(user_id),
        SessionKind::Auth,
        &token,
        expired_at,
    )
    .await
    .map_err(|e| {
        error!(error = %e, session_id = %session_id, "session insert failed");
        ApiError::SessionNotCreated
    })?;

    info!(user_id = %user_id, session_id = %session_id, "user logged in");
    Ok(LoginResponse {
        id: session_id,
        kind: SessionKind::Auth,
        user: public,
        jwt: token,
        expired_at,
    })
}

pub async fn anonymous_login(
    state: &AppState,
    req: AnonymousLoginRequest,
) -> Result<AnonymousLoginResponse, ApiError> {
    if req.seed.trim().is_empty() {
        return Err(ApiError::Validation("seed must not be empty".into()));
    }

    let keys = JwtKeys::from_ref(state);
    let session_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    let expired_at = now + keys.ttl_for(SessionKind::Anonymous);

    let claims = SessionClaims {
        id: session_id,
        kind: SessionKind::Anonymous,
        user_id: None,
        user: None,
        seed: Some(req.seed),
        expired_at,
        exp: expired_at.unix_timestamp() as usize,
        iat: now.unix_timestamp() as usize,
    };
    let token = keys.sign(&claims).map_err(ApiError::Internal)?;

    Session::create(
        &state.db,
        session_id,
        None,
        SessionKind::Anonymous,
        &token,
        expired_at,
    )
    .await
    .map_err(|e| {
        error!(error = %e, session_id = %session_id, "session insert failed");
        ApiError::SessionNotCreated
    })?;

    info!(session_id = %session_id, "anonymous session issued");
    Ok(AnonymousLoginResponse {
        id: session_id,
        user_id: None,
        kind: SessionKind::Anonymous,
        jwt: token,
        expired_at,
    })
}
