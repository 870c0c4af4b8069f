use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub auth_service_url: String,
    pub server_host: String,
    pub server_port: u16,
}

/// JWT_EXPIRATION 以小时为单位，允许 "24h" 这种写法，非法值回落到24
fn parse_expiration_hours(raw: &str) -> u64 {
    raw.trim_end_matches('h').parse().unwrap_or(24)
}

/// SERVER_PORT 缺省和非法值都回落到3000
fn parse_port(raw: &str) -> u16 {
    raw.parse().unwrap_or(3000)
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration =
            parse_expiration_hours(&env::var("JWT_EXPIRATION").unwrap_or_else(|_| "24".into()));

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            auth_service_url: env::var("AUTH_SERVICE_URL")
                .unwrap_or_else(|_| "http://auth:3002".into()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: parse_port(&env::var("SERVER_PORT").unwrap_or_else(|_| "3000".into())),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }
}
