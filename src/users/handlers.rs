use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::AuthSession;
use crate::auth::handlers::{parse_birthdate, parse_gender, read_file, text};
use crate::avatars::AvatarUpload;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{Page, PageOptions, UpdateUserRequest};
use crate::users::repo_types::PublicUser;
use crate::users::services;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/get-all", get(get_all))
        .route("/users/get-account/:id", get(get_account))
        .route("/users/update-account/:id", patch(update_account))
        .route("/users/delete-account/:id", delete(delete_account))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}

#[instrument(skip(state, _session))]
pub async fn get_all(
    State(state): State<AppState>,
    _session: AuthSession,
    Query(options): Query<PageOptions>,
) -> Result<Json<Page<PublicUser>>, ApiError> {
    Ok(Json(services::find_all(&state, options).await?))
}

#[instrument(skip(state, _session))]
pub async fn get_account(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    Ok(Json(services::find_one(&state, id).await?))
}

#[instrument(skip(state, _session, mp))]
pub async fn update_account(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> Result<Json<PublicUser>, ApiError> {
    let (req, file) = parse_update_form(&mut mp).await?;
    Ok(Json(services::update(&state, id, req, file).await?))
}

#[instrument(skip(state, _session))]
pub async fn delete_account(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    services::remove(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn parse_update_form(
    mp: &mut Multipart,
) -> Result<(UpdateUserRequest, Option<AvatarUpload>), ApiError> {
    let mut req = UpdateUserRequest::default();
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
            "username" => req.username = Some(text(field).await?),
            "email" => req.email = Some(text(field).await?.trim().to_lowercase()),
            "password" => req.password = Some(text(field).await?),
            "birthdate" => req.birthdate = Some(parse_birthdate(&text(field).await?)?),
            "gender" => req.gender = Some(parse_gender(&text(field).await?)?),
            _ => {}
        }
    }

    Ok((req, file))
}
