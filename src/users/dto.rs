use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::auth::validate::{
    is_adult, is_valid_email, is_valid_name, is_valid_password, is_valid_username,
};
use crate::error::ApiError;
use crate::users::repo_types::Gender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Order {
    Asc,
    Desc,
}

const MAX_TAKE: i64 = 50;

/// Query parameters for the paged user listing.
#[derive(Debug, Deserialize)]
pub struct PageOptions {
    #[serde(default = "default_order")]
    pub order: Order,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_take")]
    pub take: i64,
}

fn default_order() -> Order {
    Order::Asc
}
fn default_page() -> i64 {
    1
}
fn default_take() -> i64 {
    10
}

impl PageOptions {
    pub fn take(&self) -> i64 {
        self.take.clamp(1, MAX_TAKE)
    }

    pub fn skip(&self) -> i64 {
        (self.page.max(1) - 1) * self.take()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub take: i64,
    pub item_count: i64,
    pub page_count: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl PageMeta {
    pub fn new(options: &PageOptions, item_count: i64) -> Self {
        let page = options.page.max(1);
        let take = options.take();
        let page_count = (item_count + take - 1) / take;
        Self {
            page,
            take,
            item_count,
            page_count,
            has_previous_page: page > 1,
            has_next_page: page < page_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// Partial profile update, collected from the multipart form. Absent fields
/// keep their stored values.
#[derive(Debug, Default)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub birthdate: Option<Date>,
    pub gender: Option<Gender>,
}

impl UpdateUserRequest {
    /// Same per-field rules as registration, applied only to the fields that
    /// are present.
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(username) = &self.username {
            if !is_valid_username(username) {
                return Err(ApiError::Validation(
                    "username must be 5-25 chars, alphanumeric plus _ and -".into(),
                ));
            }
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(ApiError::Validation("email must be a valid address".into()));
            }
        }
        if let Some(password) = &self.password {
            if !is_valid_password(password) {
                return Err(ApiError::Validation(
                    "password must be 8-30 chars with an uppercase letter, a lowercase letter and a digit"
                        .into(),
                ));
            }
        }
        for name in [&self.first_name, &self.last_name].into_iter().flatten() {
            if !is_valid_name(name) {
                return Err(ApiError::Validation("names must be 3-30 chars".into()));
            }
        }
        if let Some(birthdate) = self.birthdate {
            if !is_adult(birthdate, OffsetDateTime::now_utc().date()) {
                return Err(ApiError::Validation("must be at least 18 years old".into()));
            }
        }
        Ok(())
    }
}
