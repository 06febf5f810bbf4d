//! Service configuration loaded from environment variables (and `.env`).
//!
//! Required: `DATABASE_URL`, `SECRET`, `ADMIN_PASSWORD`, `USER_PASSWORD`.
//! Optional: `BIND_ADDR` (default `0.0.0.0:3000`), `UPLOAD_DIR` (default `./uploads`),
//! `MAX_IMAGE_SIZE` in bytes (default 3 MiB).

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";
pub const DEFAULT_MAX_IMAGE_SIZE: usize = 3_145_728;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid environment variable {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// HS256 key for customer and admin tokens.
    pub secret: String,
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_image_size: usize,
    pub admin_password: String,
    pub user_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::Invalid("BIND_ADDR", err.to_string()))?;

        let max_image_size = match lookup("MAX_IMAGE_SIZE") {
            Some(value) => value
                .parse::<usize>()
                .map_err(|err| ConfigError::Invalid("MAX_IMAGE_SIZE", err.to_string()))?,
            None => DEFAULT_MAX_IMAGE_SIZE,
        };

        let secret = required("SECRET")?;
        if secret.is_empty() {
            return Err(ConfigError::Invalid("SECRET", "must not be empty".into()));
        }

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            secret,
            bind_addr,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_image_size,
            admin_password: required("ADMIN_PASSWORD")?,
            user_password: required("USER_PASSWORD")?,
        })
    }
}
