use crate::errors::AppError;
use dotenvy::dotenv;
use std::{env, str::FromStr, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// When unset the service runs on the in-memory backend.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub bcrypt_cost: u32,
    /// Seconds a live summary may go unread before it is unmounted; 0 keeps
    /// bindings until they are deleted.
    pub live_summary_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("SERVER_PORT", 3000)?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 20)?,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| AppError::Internal("JWT_SECRET must be set".to_string()))?,
            jwt_expiry_hours: parse_var("JWT_EXPIRY_HOURS", 5)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            live_summary_idle_secs: parse_var("LIVE_SUMMARY_IDLE_SECS", 900)?,
        })
    }

    pub fn live_summary_idle(&self) -> Option<Duration> {
        (self.live_summary_idle_secs > 0).then(|| Duration::from_secs(self.live_summary_idle_secs))
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::Internal(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
