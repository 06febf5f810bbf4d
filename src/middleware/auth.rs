use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use thiserror::Error;
use tracing::debug;

use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::error::ApiError;

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".into()))?;

    let claims = validate_token(&state.db, &state.secret, token, state.role)
        .await
        .map_err(|err| {
            debug!(error = %err, "Rejected token");
            match err {
                AuthMiddlewareError::Database(db_err) => ApiError::Db(db_err),
                other => ApiError::Unauthorized(other.to_string()),
            }
        })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: String,
    pub exp: usize,
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub secret: Arc<str>,
    pub role: Role,
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Invalid user id or role")]
    InvalidUserOrRole,
    #[error("Token expired or malformed")]
    TokenRejected,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub fn generate_token(user_id: i32, role: Role, secret: &str) -> Result<String, AuthMiddlewareError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims {
        user_id,
        role: role.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

pub async fn validate_token(
    db: &DatabaseConnection,
    secret: &str,
    token: &str,
    required_role: Role,
) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthMiddlewareError::TokenRejected)?
    .claims;

    let role = Role::from_str(&claims.role).map_err(|_| AuthMiddlewareError::InvalidUserOrRole)?;
    if role != required_role {
        return Err(AuthMiddlewareError::InvalidUserOrRole);
    }

    UserEntity::find_by_id(claims.user_id)
        .filter(user::Column::Role.eq(role))
        .one(db)
        .await?
        .ok_or(AuthMiddlewareError::InvalidUserOrRole)?;

    Ok(claims)
}
