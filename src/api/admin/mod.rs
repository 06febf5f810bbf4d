pub mod category;
pub mod image;
pub mod listing;
pub mod notebook;
pub mod smartphone;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use category::admin_category_router;
use image::admin_image_router;
use listing::admin_listing_router;
use notebook::admin_notebook_router;
use smartphone::admin_smartphone_router;

use crate::config::Config;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};

pub fn admin_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .merge(admin_category_router(db.clone()))
        .merge(admin_notebook_router(db.clone()))
        .merge(admin_smartphone_router(db.clone()))
        .merge(admin_image_router(db.clone(), config.clone()))
        .merge(admin_listing_router(db.clone()))
        .layer(from_fn_with_state(
            AuthState {
                db,
                secret: Arc::from(config.secret.as_str()),
                role: Role::Admin,
            },
            auth_middleware,
        ))
}
