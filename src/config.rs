use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub auth_session_hours: i64,
    pub anonymous_session_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket_uploads: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub s3: S3Config,
    /// Whether POST /auth/register demands a valid bearer token.
    pub registration_requires_auth: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            auth_session_hours: std::env::var("AUTH_SESSION_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
            anonymous_session_hours: std::env::var("ANONYMOUS_SESSION_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(1),
        };
        anyhow::ensure!(
            jwt.anonymous_session_hours < jwt.auth_session_hours,
            "ANONYMOUS_SESSION_HOURS must be shorter than AUTH_SESSION_HOURS"
        );
        let s3 = S3Config {
            endpoint: std::env::var("S3_ENDPOINT")?,
            bucket_uploads: std::env::var("S3_BUCKET_UPLOADS")?,
            access_key: std::env::var("S3_ACCESS_KEY")?,
            secret_key: std::env::var("S3_SECRET_KEY")?,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
        };
        let registration_requires_auth = std::env::var("REGISTRATION_REQUIRES_AUTH")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        Ok(Self {
            database_url,
            jwt,
            s3,
            registration_requires_auth,
        })
    }
}
