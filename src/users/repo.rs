use sqlx::PgPool;
use uuid::Uuid;

use crate::users::dto::Order;
use crate::users::repo_types::{Gender, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, avatar, \
     birthdate, gender, updated_at, created_at";

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub avatar: &'a str,
    pub birthdate: Option<time::Date>,
    pub gender: Gender,
}

impl User {
    /// OR-combined match used by the registration uniqueness precheck.
    pub async fn find_by_email_or_username(
        db: &PgPool,
        email: &str,
        username: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR username = $2"
        ))
        .bind(email)
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Login lookup: the login id may be either the email or the username.
    pub async fn find_by_login_id(db: &PgPool, login_id: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR username = $1"
        ))
        .bind(login_id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(db: &PgPool, new: NewUser<'_>) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name, avatar, birthdate, gender)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.username)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.avatar)
        .bind(new.birthdate)
        .bind(new.gender)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Full-row update; `updated_at` is bumped server-side.
    pub async fn update(db: &PgPool, u: &User) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, first_name = $5,
                last_name = $6, avatar = $7, birthdate = $8, gender = $9, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(u.id)
        .bind(&u.username)
        .bind(&u.email)
        .bind(&u.password_hash)
        .bind(&u.first_name)
        .bind(&u.last_name)
        .bind(&u.avatar)
        .bind(u.birthdate)
        .bind(u.gender)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn count_by_username(db: &PgPool, username: &str) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(db)
                .await?;
        Ok(count)
    }

    pub async fn count_by_email(db: &PgPool, email: &str) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    pub async fn count_all(db: &PgPool) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    pub async fn list_page(
        db: &PgPool,
        order: Order,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<User>> {
        let direction = match order {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        };
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at {direction} LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
