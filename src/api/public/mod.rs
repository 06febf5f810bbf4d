pub mod auth;
pub mod category;
pub mod product;
pub mod uploads;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use auth::auth_router;
use category::category_router;
use product::product_router;
use uploads::uploads_router;

pub fn public_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .merge(auth_router(db.clone(), config.clone()))
        .merge(category_router(db.clone()))
        .merge(product_router(db.clone()))
        .merge(uploads_router(db, config))
}
