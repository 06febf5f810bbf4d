use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;

use crate::entities::{category, category::Entity as CategoryEntity};
use crate::error::ApiError;
use crate::services::{
    products::{self, ProductSummary},
    sidebar::categories_for_sidebar,
};

pub fn category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/category", get(get_categories))
        .route("/category/sidebar", get(get_sidebar))
        .route("/category/:slug", get(get_category))
        .layer(Extension(db))
}

async fn get_categories(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let categories: Vec<CategoryResponse> = CategoryEntity::find()
        .order_by_asc(category::Column::Id)
        .all(&txn)
        .await?
        .into_iter()
        .map(CategoryResponse::new)
        .collect();

    txn.commit().await?;
    Ok((StatusCode::OK, Json(categories)).into_response())
}

async fn get_sidebar(Extension(db): Extension<Arc<DatabaseConnection>>) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let sidebar = categories_for_sidebar(&txn).await?;
    txn.commit().await?;
    Ok((StatusCode::OK, Json(sidebar)).into_response())
}

async fn get_category(
    Path(slug): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let category = CategoryEntity::find()
        .filter(category::Column::Slug.eq(slug.as_str()))
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No category with {slug} slug was found.")))?;

    let products = products::in_category(&txn, category.id).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(CategoryDetailResponse {
            category: CategoryResponse::new(category),
            products,
        }),
    )
        .into_response())
}

#[derive(Serialize)]
struct CategoryResponse {
    id: i32,
    name: String,
    slug: String,
    url: String,
}

impl CategoryResponse {
    fn new(value: category::Model) -> CategoryResponse {
        CategoryResponse {
            url: value.url(),
            id: value.id,
            name: value.name,
            slug: value.slug,
        }
    }
}

#[derive(Serialize)]
struct CategoryDetailResponse {
    category: CategoryResponse,
    products: Vec<ProductSummary>,
}
