pub mod admin;
pub mod public;
pub mod user;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

pub fn create_api_router(shared_db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .nest(
            "/api",
            public_api_router(shared_db.clone(), config.clone())
                .merge(user_api_router(shared_db.clone(), config.clone())),
        )
        .nest("/api/admin", admin_api_router(shared_db, config))
}
