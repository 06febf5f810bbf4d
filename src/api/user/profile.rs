use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::entities::{customer, user};
use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::services::cart::customer_for_user;

pub fn profile_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/profile", get(get_profile).patch(patch_profile))
        .layer(Extension(db))
}

async fn get_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let (user, customer) = load_profile(&txn, claims.user_id).await?;
    txn.commit().await?;
    Ok((StatusCode::OK, Json(ProfileResponse::new(user, customer))).into_response())
}

async fn patch_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchProfile>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let (user, customer) = load_profile(&txn, claims.user_id).await?;

    let mut user_update: user::ActiveModel = user.clone().into();
    if let Some(first_name) = payload.first_name {
        user_update.first_name = Set(first_name);
    }
    if let Some(last_name) = payload.last_name {
        user_update.last_name = Set(last_name);
    }
    let user = if user_update.is_changed() {
        user_update.update(&txn).await?
    } else {
        user
    };

    let mut customer_update: customer::ActiveModel = customer.clone().into();
    if let Some(phone) = payload.phone {
        customer_update.phone = Set(phone);
    }
    if let Some(address) = payload.address {
        customer_update.address = Set(address);
    }
    let customer = if customer_update.is_changed() {
        customer_update.update(&txn).await?
    } else {
        customer
    };
    txn.commit().await?;

    Ok((StatusCode::OK, Json(ProfileResponse::new(user, customer))).into_response())
}

async fn load_profile<C: sea_orm::ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<(user::Model, customer::Model), ApiError> {
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No user with {user_id} id was found.")))?;
    let customer = customer_for_user(db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No customer profile for this user".into()))?;
    Ok((user, customer))
}

#[derive(Deserialize, Validate)]
struct PatchProfile {
    #[validate(length(max = 150))]
    first_name: Option<String>,
    #[validate(length(max = 150))]
    last_name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    phone: Option<String>,
    #[validate(length(min = 1, max = 255))]
    address: Option<String>,
}

#[derive(Serialize)]
struct ProfileResponse {
    customer_id: i32,
    username: String,
    first_name: String,
    last_name: String,
    phone: String,
    address: String,
    label: String,
}

impl ProfileResponse {
    fn new(user: user::Model, customer: customer::Model) -> Self {
        ProfileResponse {
            label: customer::label(&user),
            customer_id: customer.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: customer.phone,
            address: customer.address,
        }
    }
}
