use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::entities::{category::Entity as CategoryEntity, product_kind::ProductKind};
use crate::error::ApiError;
use crate::services::{
    latest::latest_products,
    products::{self, ProductDetail},
};

pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/products/latest", get(get_latest))
        .route("/products/:kind/:slug", get(get_product))
        .layer(Extension(db))
}

async fn get_latest(
    Query(params): Query<LatestQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let names: Vec<String> = match params.kinds {
        Some(kinds) => kinds
            .split(',')
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect(),
        None => ProductKind::ALL.iter().map(|kind| kind.to_string()).collect(),
    };
    debug!(?names, with_respect_to = ?params.with_respect_to, "Latest products");

    let txn = db.begin().await?;
    let products = latest_products(&txn, &names, params.with_respect_to.as_deref()).await?;
    txn.commit().await?;
    Ok((StatusCode::OK, Json(products)).into_response())
}

async fn get_product(
    Path((kind, slug)): Path<(String, String)>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let kind = kind
        .parse::<ProductKind>()
        .map_err(|err| ApiError::NotFound(err.to_string()))?;

    let txn = db.begin().await?;
    let product = products::find_by_slug(&txn, kind, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No {kind} with {slug} slug was found.")))?;

    let summary = product.summary();
    let category = CategoryEntity::find_by_id(summary.category_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Product {} has no category", summary.id)))?;

    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(ProductResponse {
            label: products::label(&category, &summary.title),
            url: summary.url,
            category_url: category.url(),
            product,
        }),
    )
        .into_response())
}

#[derive(Deserialize)]
struct LatestQuery {
    kinds: Option<String>,
    with_respect_to: Option<String>,
}

#[derive(Serialize)]
struct ProductResponse {
    product: ProductDetail,
    label: String,
    url: String,
    category_url: String,
}
