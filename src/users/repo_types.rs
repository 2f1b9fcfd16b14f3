use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(birthdate_format, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Male
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

/// User record in the database. The password hash never leaves this type;
/// API responses go through [`PublicUser`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: String,
    pub birthdate: Option<Date>,
    pub gender: Gender,
    pub updated_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

/// Redacted projection of a user: every column except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: String,
    #[serde(default, with = "birthdate_format::option")]
    pub birthdate: Option<Date>,
    pub gender: Gender,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            avatar: u.avatar,
            birthdate: u.birthdate,
            gender: u.gender,
            updated_at: u.updated_at,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn sample_user() -> User {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        User {
            id: Uuid::new_v4(),
            username: "alice123".into(),
            email: "a@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            first_name: Some("Alice".into()),
            last_name: None,
            avatar: "default-avatar.png".into(),
            birthdate: Some(date!(1990 - 01 - 02)),
            gender: Gender::Female,
            updated_at: now,
            created_at: now,
        }
    }

    #[test]
    fn projection_drops_the_password_hash() {
        let user = sample_user();
        let public: PublicUser = user.clone().into();
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["username"], "alice123");
        assert_eq!(json["firstName"], "Alice");
        assert_eq!(json["gender"], "female");
        assert_eq!(json["birthdate"], "1990-01-02");
    }

    #[test]
    fn projection_keeps_every_profile_field() {
        let user = sample_user();
        let public: PublicUser = user.clone().into();
        assert_eq!(public.id, user.id);
        assert_eq!(public.email, user.email);
        assert_eq!(public.avatar, user.avatar);
        assert_eq!(public.birthdate, user.birthdate);
        assert_eq!(public.created_at, user.created_at);
    }

    #[test]
    fn gender_parses_from_form_values() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("other".parse::<Gender>().is_err());
        assert_eq!(Gender::default(), Gender::Male);
    }
}
