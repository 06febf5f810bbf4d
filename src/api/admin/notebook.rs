use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::entities::{notebook, product_kind::ProductKind};
use crate::error::ApiError;
use crate::services::{
    cart::remove_lines_for_products,
    forms::{form_fields, nullable, AdminForm},
    products::{self, AdminProduct, ProductDetail},
    slug::{resolve_slug, SLUG_REGEX},
};

const KIND: ProductKind = ProductKind::Notebook;

//ROUTERS
pub fn admin_notebook_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/notebook", post(create_notebook))
        .route("/notebook/form", get(notebook_form))
        .route(
            "/notebook/:id",
            get(admin_get_notebook)
                .patch(patch_notebook)
                .delete(delete_notebook),
        )
        .layer(Extension(db))
}

//ROUTES
async fn notebook_form(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let form = AdminForm {
        kind: KIND,
        fields: form_fields(KIND, None),
        category_choices: products::category_choices(&txn, KIND).await?,
    };
    txn.commit().await?;
    Ok((StatusCode::OK, Json(form)).into_response())
}

async fn create_notebook(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateNotebook>,
) -> Result<Response, ApiError> {
    payload.validate()?;
    let price = products::check_price(payload.price)?;
    let slug = resolve_slug(payload.slug, &payload.title)
        .ok_or_else(|| ApiError::BadRequest("Slug can not be derived from the title".into()))?;

    let txn = db.begin().await?;
    let category = products::allowed_category(&txn, KIND, payload.category_id).await?;
    products::ensure_image(&txn, payload.image_id).await?;
    if products::slug_taken(&txn, KIND, &slug, None).await? {
        return Err(ApiError::Conflict(format!("Notebook with {slug} slug already exists")));
    }

    let notebook = notebook::ActiveModel {
        category_id: Set(category.id),
        title: Set(payload.title),
        slug: Set(slug),
        image_id: Set(payload.image_id),
        description: Set(payload.description),
        price: Set(price),
        name: Set(payload.name),
        diagonal: Set(payload.diagonal),
        display_type: Set(payload.display_type),
        processor_freq: Set(payload.processor_freq),
        ram: Set(payload.ram),
        video: Set(payload.video),
        time_without_charge: Set(payload.time_without_charge),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(notebook_id = notebook.id, slug = %notebook.slug, "Notebook created");
    Ok((
        StatusCode::CREATED,
        Json(AdminProduct::new(ProductDetail::Notebook(notebook), &category)),
    )
        .into_response())
}

async fn admin_get_notebook(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let notebook = find_notebook(&txn, id).await?;
    let category = products::category_of(&txn, notebook.category_id).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(AdminProduct::new(ProductDetail::Notebook(notebook), &category)),
    )
        .into_response())
}

async fn patch_notebook(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchNotebook>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let notebook = find_notebook(&txn, id).await?;
    let mut update: notebook::ActiveModel = notebook.clone().into();

    let category = match payload.category_id {
        Some(category_id) => {
            let category = products::allowed_category(&txn, KIND, category_id).await?;
            update.category_id = Set(category.id);
            category
        }
        None => products::category_of(&txn, notebook.category_id).await?,
    };
    if let Some(slug) = payload.slug {
        if products::slug_taken(&txn, KIND, &slug, Some(id)).await? {
            return Err(ApiError::Conflict(format!("Notebook with {slug} slug already exists")));
        }
        update.slug = Set(slug);
    }
    if let Some(image_id) = payload.image_id {
        products::ensure_image(&txn, image_id).await?;
        update.image_id = Set(image_id);
    }
    if let Some(price) = payload.price {
        update.price = Set(products::check_price(price)?);
    }
    if let Some(description) = payload.description {
        update.description = Set(description);
    }
    macro_rules! patch_text {
        ($($field:ident),+) => {
            $(if let Some(value) = payload.$field {
                update.$field = Set(value);
            })+
        };
    }
    patch_text!(
        title,
        name,
        diagonal,
        display_type,
        processor_freq,
        ram,
        video,
        time_without_charge
    );

    let notebook = if update.is_changed() {
        update.update(&txn).await?
    } else {
        notebook
    };
    txn.commit().await?;

    Ok((
        StatusCode::OK,
        Json(AdminProduct::new(ProductDetail::Notebook(notebook), &category)),
    )
        .into_response())
}

async fn delete_notebook(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let notebook = find_notebook(&txn, id).await?;

    remove_lines_for_products(&txn, KIND, &[id]).await?;
    notebook.delete(&txn).await?;
    txn.commit().await?;

    info!(notebook_id = id, "Notebook deleted");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Resource deleted successfully."
        })),
    )
        .into_response())
}

async fn find_notebook<C: ConnectionTrait>(db: &C, id: i32) -> Result<notebook::Model, ApiError> {
    notebook::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No notebook with {id} id was found.")))
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct CreateNotebook {
    category_id: i32,
    #[validate(length(min = 1, max = 255))]
    title: String,
    #[validate(regex(path = *SLUG_REGEX))]
    slug: Option<String>,
    image_id: i32,
    description: Option<String>,
    price: Decimal,
    #[validate(length(max = 255))]
    name: String,
    #[validate(length(max = 255))]
    diagonal: String,
    #[validate(length(max = 255))]
    display_type: String,
    #[validate(length(max = 255))]
    processor_freq: String,
    #[validate(length(max = 255))]
    ram: String,
    #[validate(length(max = 255))]
    video: String,
    #[validate(length(max = 255))]
    time_without_charge: String,
}

#[derive(Deserialize, Validate)]
struct PatchNotebook {
    category_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    title: Option<String>,
    #[validate(regex(path = *SLUG_REGEX))]
    slug: Option<String>,
    image_id: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    description: Option<Option<String>>,
    price: Option<Decimal>,
    #[validate(length(max = 255))]
    name: Option<String>,
    #[validate(length(max = 255))]
    diagonal: Option<String>,
    #[validate(length(max = 255))]
    display_type: Option<String>,
    #[validate(length(max = 255))]
    processor_freq: Option<String>,
    #[validate(length(max = 255))]
    ram: Option<String>,
    #[validate(length(max = 255))]
    video: Option<String>,
    #[validate(length(max = 255))]
    time_without_charge: Option<String>,
}
