pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod services;

use axum::{middleware::from_fn, Router};
use sea_orm::{Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::api::create_api_router;
use crate::config::{Config, ConfigError};
use crate::entities::{primary_setup, setup_schema};
use crate::middleware::logging::logging_middleware;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("Failed to seed database: {0}")]
    Seed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connects, creates missing tables and seeds the default accounts and categories.
pub async fn init_database(config: &Config) -> Result<DatabaseConnection, StartupError> {
    let db = Database::connect(&config.database_url).await?;
    setup_schema(&db).await?;
    primary_setup(&db, config).await?;
    Ok(db)
}

pub fn create_app(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    create_api_router(db, config)
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
