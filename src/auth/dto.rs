use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::auth::repo_types::SessionKind;
use crate::auth::validate::{
    is_adult, is_valid_email, is_valid_name, is_valid_password, is_valid_username,
};
use crate::error::ApiError;
use crate::users::repo_types::{Gender, PublicUser};

/// Registration fields, collected from the multipart form.
#[derive(Debug, Default)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub birthdate: Option<Date>,
    pub gender: Gender,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !is_valid_username(&self.username) {
            return Err(ApiError::Validation(
                "username must be 5-25 chars, alphanumeric plus _ and -".into(),
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(ApiError::Validation("email must be a valid address".into()));
        }
        if !is_valid_password(&self.password) {
            return Err(ApiError::Validation(
                "password must be 8-30 chars with an uppercase letter, a lowercase letter and a digit"
                    .into(),
            ));
        }
        for name in [&self.first_name, &self.last_name].into_iter().flatten() {
            if !is_valid_name(name) {
                return Err(ApiError::Validation("names must be 3-30 chars".into()));
            }
        }
        if let Some(birthdate) = self.birthdate {
            let today = OffsetDateTime::now_utc().date();
            if !is_adult(birthdate, today) {
                return Err(ApiError::Validation("must be at least 18 years old".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email.
    pub login_id: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AnonymousLoginRequest {
    /// Opaque client-supplied entropy, passed through into the token claims.
    pub seed: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: Uuid, // session id
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub user: PublicUser,
    pub jwt: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expired_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousLoginResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>, // always null
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub jwt: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expired_at: OffsetDateTime,
}
