use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::config::Config;
use crate::entities::{
    customer,
    user::{self, Entity as UserEntity, Role},
};
use crate::error::ApiError;
use crate::middleware::auth::generate_token;

pub fn auth_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(Extension(db))
        .layer(Extension(config))
}

async fn register(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterCustomer>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    if UserEntity::find()
        .filter(user::Column::Username.eq(payload.username.as_str()))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already exists".into()));
    }

    let password = user::hash_password(&payload.password)
        .map_err(|err| ApiError::Internal(format!("Failed to hash password: {err}")))?;

    let user = user::ActiveModel {
        username: Set(payload.username),
        password: Set(password),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        role: Set(Role::User),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let customer = customer::ActiveModel {
        user_id: Set(user.id),
        phone: Set(payload.phone),
        address: Set(payload.address),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(user_id = user.id, customer_id = customer.id, "Customer registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "customer_id": customer.id,
        })),
    )
        .into_response())
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Json(payload): Json<UserLogin>,
) -> Result<Response, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid username or password".into());

    let user = UserEntity::find()
        .filter(user::Column::Username.eq(payload.username.as_str()))
        .one(db.as_ref())
        .await?
        .ok_or_else(invalid)?;
    user.check_hash(&payload.password).map_err(|_| invalid())?;

    let token = generate_token(user.id, user.role, &config.secret)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok((StatusCode::OK, Json(json!({ "token": token }))).into_response())
}

#[derive(Deserialize, Validate)]
struct RegisterCustomer {
    #[validate(length(min = 3, max = 150))]
    username: String,
    #[validate(length(min = 8, max = 128))]
    password: String,
    #[validate(length(max = 150))]
    first_name: String,
    #[validate(length(max = 150))]
    last_name: String,
    #[validate(length(min = 1, max = 20))]
    phone: String,
    #[validate(length(min = 1, max = 255))]
    address: String,
}

#[derive(Deserialize)]
struct UserLogin {
    username: String,
    password: String,
}
