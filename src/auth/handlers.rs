use axum::{
    extract::{multipart::Field, DefaultBodyLimit, FromRef, Multipart, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use time::{macros::format_description, Date};
use tracing::instrument;

use crate::auth::dto::{
    AnonymousLoginRequest, AnonymousLoginResponse, LoginRequest, LoginResponse, RegisterRequest,
};
use crate::auth::extractors::verify_bearer;
use crate::auth::jwt::JwtKeys;
use crate::auth::services;
use crate::avatars::AvatarUpload;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo_types::{Gender, PublicUser};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/anonymous-login", post(anonymous_login))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB avatar uploads
}

#[instrument(skip(state, headers, mp))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut mp: Multipart,
) -> Result<Json<PublicUser>, ApiError> {
    // Deployment-configurable: some installations only let existing users
    // create accounts.
    if state.config.registration_requires_auth {
        let keys = JwtKeys::from_ref(&state);
        verify_bearer(&keys, &headers)?;
    }

    let (req, file) = parse_register_form(&mut mp).await?;
    let user = services::register(&state, req, file).await?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(services::login(&state, payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn anonymous_login(
    State(state): State<AppState>,
    Json(payload): Json<AnonymousLoginRequest>,
) -> Result<Json<AnonymousLoginResponse>, ApiError> {
    Ok(Json(services::anonymous_login(&state, payload).await?))
}

async fn parse_register_form(
    mp: &mut Multipart,
) -> Result<(RegisterRequest, Option<AvatarUpload>), ApiError> {
    let mut req = RegisterRequest::default();
    let mut gender: Option<Gender> = None;
    let mut file = None;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("malformed multipart body".into()))?
    {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };
        match name.as_str() {
            "file" => file = Some(read_file(field).await?),
            "firstName" => req.first_name = Some(text(field).await?),
            "lastName" => req.last_name = Some(text(field).await?),
            "username" => req.username = text(field).await?,
            "email" => req.email = text(field).await?.trim().to_lowercase(),
            "password" => req.password = text(field).await?,
            "birthdate" => req.birthdate = Some(parse_birthdate(&text(field).await?)?),
            "gender" => gender = Some(parse_gender(&text(field).await?)?),
            _ => {}
        }
    }

    if req.username.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "username, email and password are required".into(),
        ));
    }
    req.gender = gender.ok_or_else(|| ApiError::Validation("gender is required".into()))?;

    Ok((req, file))
}

pub(crate) async fn read_file(field: Field<'_>) -> Result<AvatarUpload, ApiError> {
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".into());
    let body = field
        .bytes()
        .await
        .map_err(|_| ApiError::Validation("could not read avatar file".into()))?;
    Ok(AvatarUpload { body, content_type })
}

pub(crate) async fn text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|_| ApiError::Validation("malformed multipart field".into()))
}

pub(crate) fn parse_birthdate(s: &str) -> Result<Date, ApiError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(s, &format)
        .map_err(|_| ApiError::Validation("birthdate must be YYYY-MM-DD".into()))
}

pub(crate) fn parse_gender(s: &str) -> Result<Gender, ApiError> {
    s.parse().map_err(ApiError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn birthdate_parses_iso_dates_only() {
        assert_eq!(parse_birthdate("1990-01-02").unwrap(), date!(1990 - 01 - 02));
        assert!(parse_birthdate("02/01/1990").is_err());
        assert!(parse_birthdate("1990-13-01").is_err());
        assert!(parse_birthdate("").is_err());
    }

    #[test]
    fn gender_parses_enum_values_only() {
        assert_eq!(parse_gender("male").unwrap(), Gender::Male);
        assert_eq!(parse_gender("female").unwrap(), Gender::Female);
        assert!(parse_gender("MALE").is_err());
        assert!(parse_gender("").is_err());
    }
}
