use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::services::is_unique_violation;
use crate::avatars::{self, AvatarUpload};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{Page, PageMeta, PageOptions, UpdateUserRequest};
use crate::users::repo_types::{PublicUser, User};

pub async fn find_all(
    state: &AppState,
    options: PageOptions,
) -> Result<Page<PublicUser>, ApiError> {
    let item_count = User::count_all(&state.db).await.map_err(ApiError::Internal)?;
    let users = User::list_page(&state.db, options.order, options.take(), options.skip())
        .await
        .map_err(ApiError::Internal)?;
    let meta = PageMeta::new(&options, item_count);
    Ok(Page {
        data: users.into_iter().map(Into::into).collect(),
        meta,
    })
}

pub async fn find_one(state: &AppState, id: Uuid) -> Result<PublicUser, ApiError> {
    User::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .map(Into::into)
        .ok_or(ApiError::UserNotFound)
}

pub async fn update(
    state: &AppState,
    id: Uuid,
    req: UpdateUserRequest,
    file: Option<AvatarUpload>,
) -> Result<PublicUser, ApiError> {
    req.validate()?;

    let mut user = User::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::UserNotFound)?;

    if let Some(username) = &req.username {
        if *username != user.username
            && User::count_by_username(&state.db, username)
                .await
                .map_err(ApiError::Internal)?
                > 0
        {
            return Err(ApiError::UsernameExists);
        }
    }
    if let Some(email) = &req.email {
        if *email != user.email
            && User::count_by_email(&state.db, email)
                .await
                .map_err(ApiError::Internal)?
                > 0
        {
            return Err(ApiError::EmailExists);
        }
    }

    if let Some(file) = file {
        let username = req.username.as_deref().unwrap_or(&user.username);
        let old_avatar = user.avatar.clone();
        user.avatar = avatars::replace_avatar(state.storage.as_ref(), username, &old_avatar, file)
            .await
            .map_err(ApiError::Internal)?;
    }

    if let Some(v) = req.username {
        user.username = v;
    }
    if let Some(v) = req.email {
        user.email = v;
    }
    if let Some(v) = req.first_name {
        user.first_name = Some(v);
    }
    if let Some(v) = req.last_name {
        user.last_name = Some(v);
    }
    if let Some(v) = req.birthdate {
        user.birthdate = Some(v);
    }
    if let Some(v) = req.gender {
        user.gender = v;
    }
    // Hash on every write that carries a password, never on reads.
    if let Some(password) = req.password {
        user.password_hash = hash_password(&password).map_err(ApiError::Internal)?;
    }

    let saved = User::update(&state.db, &user).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::UsernameOrEmailExists
        } else {
            ApiError::Internal(e)
        }
    })?;

    info!(user_id = %saved.id, "user updated");
    Ok(saved.into())
}

pub async fn remove(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::UserNotFound)?;

    // Sessions go with the user via the FK cascade; the avatar object is our
    // responsibility (the shared placeholder is never deleted).
    avatars::delete_avatar(state.storage.as_ref(), &user.avatar)
        .await
        .map_err(ApiError::Internal)?;

    User::delete(&state.db, id).await.map_err(ApiError::Internal)?;

    info!(user_id = %id, "user deleted");
    Ok(())
}
