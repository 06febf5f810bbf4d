use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::entities::{category, category::Entity as CategoryEntity, product_kind::ProductKind};
use crate::error::ApiError;
use crate::services::{
    cart::remove_lines_for_products,
    products,
    slug::{resolve_slug, SLUG_REGEX},
};

//ROUTERS
pub fn admin_category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/category", post(create_category))
        .route(
            "/category/:id",
            get(admin_get_category)
                .patch(patch_category)
                .delete(delete_category),
        )
        .layer(Extension(db))
}

//ROUTES
async fn create_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateCategory>,
) -> Result<Response, ApiError> {
    payload.validate()?;
    let slug = resolve_slug(payload.slug, &payload.name)
        .ok_or_else(|| ApiError::BadRequest("Slug can not be derived from the name".into()))?;

    let txn = db.begin().await?;
    ensure_slug_free(&txn, &slug, None).await?;

    let category = category::ActiveModel {
        name: Set(payload.name),
        slug: Set(slug),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(category_id = category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)).into_response())
}

async fn admin_get_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let category = find_category(db.as_ref(), id).await?;
    Ok((StatusCode::OK, Json(category)).into_response())
}

async fn patch_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchCategory>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let category = find_category(&txn, id).await?;
    let mut update: category::ActiveModel = category.clone().into();

    if let Some(name) = payload.name {
        update.name = Set(name);
    }
    if let Some(slug) = payload.slug {
        ensure_slug_free(&txn, &slug, Some(id)).await?;
        update.slug = Set(slug);
    }

    let category = if update.is_changed() {
        update.update(&txn).await?
    } else {
        category
    };
    txn.commit().await?;

    Ok((StatusCode::OK, Json(category)).into_response())
}

/// Deletes the category together with its products and the cart lines pointing at them.
async fn delete_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let category = find_category(&txn, id).await?;

    for kind in ProductKind::ALL {
        let ids = products::ids_in_category(&txn, kind, id).await?;
        remove_lines_for_products(&txn, kind, &ids).await?;
    }
    let removed = products::delete_in_category(&txn, id).await?;
    category.delete(&txn).await?;
    txn.commit().await?;

    info!(category_id = id, removed_products = removed, "Category deleted");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Resource deleted successfully.",
            "removed_products": removed,
        })),
    )
        .into_response())
}

//HELPERS
async fn find_category<C: sea_orm::ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<category::Model, ApiError> {
    CategoryEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No category with {id} id was found.")))
}

async fn ensure_slug_free<C: sea_orm::ConnectionTrait>(
    db: &C,
    slug: &str,
    except_id: Option<i32>,
) -> Result<(), ApiError> {
    let taken = CategoryEntity::find()
        .filter(category::Column::Slug.eq(slug))
        .one(db)
        .await?
        .is_some_and(|found| Some(found.id) != except_id);
    if taken {
        return Err(ApiError::Conflict(format!("Category with {slug} slug already exists")));
    }
    Ok(())
}

//Struct
#[derive(Deserialize, Validate, Debug)]
struct CreateCategory {
    #[validate(length(min = 1, max = 255))]
    name: String,
    #[validate(regex(path = *SLUG_REGEX))]
    slug: Option<String>,
}

#[derive(Deserialize, Validate)]
struct PatchCategory {
    #[validate(length(min = 1, max = 255))]
    name: Option<String>,
    #[validate(regex(path = *SLUG_REGEX))]
    slug: Option<String>,
}
