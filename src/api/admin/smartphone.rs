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
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::entities::{product_kind::ProductKind, smartphone};
use crate::error::ApiError;
use crate::services::{
    cart::remove_lines_for_products,
    forms::{form_fields, nullable, AdminForm, SmartphoneForm},
    products::{self, AdminProduct, ProductDetail},
    slug::{resolve_slug, SLUG_REGEX},
};

const KIND: ProductKind = ProductKind::Smartphone;

//ROUTERS
pub fn admin_smartphone_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/smartphone", post(create_smartphone))
        .route("/smartphone/form", get(smartphone_form))
        .route(
            "/smartphone/:id",
            get(admin_get_smartphone)
                .patch(patch_smartphone)
                .delete(delete_smartphone),
        )
        .route("/smartphone/:id/form", get(smartphone_change_form))
        .layer(Extension(db))
}

//ROUTES
async fn smartphone_form(
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

/// Change form of an existing smartphone; `sd_volume_max` is read-only without a card slot.
async fn smartphone_change_form(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let smartphone = find_smartphone(&txn, id).await?;
    let form = AdminForm {
        kind: KIND,
        fields: form_fields(KIND, Some(&smartphone)),
        category_choices: products::category_choices(&txn, KIND).await?,
    };
    txn.commit().await?;
    Ok((StatusCode::OK, Json(ChangeForm { form, instance: smartphone })).into_response())
}

async fn create_smartphone(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateSmartphone>,
) -> Result<Response, ApiError> {
    payload.validate()?;
    let price = products::check_price(payload.price)?;
    let slug = resolve_slug(payload.slug, &payload.title)
        .ok_or_else(|| ApiError::BadRequest("Slug can not be derived from the title".into()))?;
    let storage = SmartphoneForm {
        sd: payload.sd,
        sd_volume_max: payload.sd_volume_max,
    }
    .clean();

    let txn = db.begin().await?;
    let category = products::allowed_category(&txn, KIND, payload.category_id).await?;
    products::ensure_image(&txn, payload.image_id).await?;
    if products::slug_taken(&txn, KIND, &slug, None).await? {
        return Err(ApiError::Conflict(format!("Smartphone with {slug} slug already exists")));
    }

    let smartphone = smartphone::ActiveModel {
        category_id: Set(category.id),
        title: Set(payload.title),
        slug: Set(slug),
        image_id: Set(payload.image_id),
        description: Set(payload.description),
        price: Set(price),
        name: Set(payload.name),
        diagonal: Set(payload.diagonal),
        display_type: Set(payload.display_type),
        resolution: Set(payload.resolution),
        accum_volume: Set(payload.accum_volume),
        ram: Set(payload.ram),
        sd: Set(storage.sd),
        sd_volume_max: Set(storage.sd_volume_max),
        main_cam_mp: Set(payload.main_cam_mp),
        frontal_cam_mp: Set(payload.frontal_cam_mp),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(smartphone_id = smartphone.id, slug = %smartphone.slug, "Smartphone created");
    Ok((
        StatusCode::CREATED,
        Json(AdminProduct::new(ProductDetail::Smartphone(smartphone), &category)),
    )
        .into_response())
}

async fn admin_get_smartphone(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let smartphone = find_smartphone(&txn, id).await?;
    let category = products::category_of(&txn, smartphone.category_id).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(AdminProduct::new(ProductDetail::Smartphone(smartphone), &category)),
    )
        .into_response())
}

async fn patch_smartphone(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchSmartphone>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let smartphone = find_smartphone(&txn, id).await?;
    let mut update: smartphone::ActiveModel = smartphone.clone().into();

    let category = match payload.category_id {
        Some(category_id) => {
            let category = products::allowed_category(&txn, KIND, category_id).await?;
            update.category_id = Set(category.id);
            category
        }
        None => products::category_of(&txn, smartphone.category_id).await?,
    };
    if let Some(slug) = payload.slug {
        if products::slug_taken(&txn, KIND, &slug, Some(id)).await? {
            return Err(ApiError::Conflict(format!("Smartphone with {slug} slug already exists")));
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
        resolution,
        accum_volume,
        ram,
        main_cam_mp,
        frontal_cam_mp
    );

    // Clean against the merged state so a patch touching only `sd` still clears the capacity.
    let storage = SmartphoneForm {
        sd: payload.sd.unwrap_or(smartphone.sd),
        sd_volume_max: payload
            .sd_volume_max
            .unwrap_or_else(|| smartphone.sd_volume_max.clone()),
    }
    .clean();
    if storage.sd != smartphone.sd {
        update.sd = Set(storage.sd);
    }
    if storage.sd_volume_max != smartphone.sd_volume_max {
        update.sd_volume_max = Set(storage.sd_volume_max);
    }

    let smartphone = if update.is_changed() {
        update.update(&txn).await?
    } else {
        smartphone
    };
    txn.commit().await?;

    Ok((
        StatusCode::OK,
        Json(AdminProduct::new(ProductDetail::Smartphone(smartphone), &category)),
    )
        .into_response())
}

async fn delete_smartphone(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let smartphone = find_smartphone(&txn, id).await?;

    remove_lines_for_products(&txn, KIND, &[id]).await?;
    smartphone.delete(&txn).await?;
    txn.commit().await?;

    info!(smartphone_id = id, "Smartphone deleted");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Resource deleted successfully."
        })),
    )
        .into_response())
}

async fn find_smartphone<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<smartphone::Model, ApiError> {
    smartphone::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No smartphone with {id} id was found.")))
}

//Structs
#[derive(Serialize)]
struct ChangeForm {
    form: AdminForm,
    instance: smartphone::Model,
}

fn default_sd() -> bool {
    true
}

#[derive(Deserialize, Validate, Debug)]
struct CreateSmartphone {
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
    resolution: String,
    #[validate(length(max = 255))]
    accum_volume: String,
    #[validate(length(max = 255))]
    ram: String,
    #[serde(default = "default_sd")]
    sd: bool,
    #[validate(length(max = 255))]
    sd_volume_max: Option<String>,
    #[validate(length(max = 255))]
    main_cam_mp: String,
    #[validate(length(max = 255))]
    frontal_cam_mp: String,
}

#[derive(Deserialize, Validate)]
struct PatchSmartphone {
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
    resolution: Option<String>,
    #[validate(length(max = 255))]
    accum_volume: Option<String>,
    #[validate(length(max = 255))]
    ram: Option<String>,
    sd: Option<bool>,
    #[validate(length(max = 255))]
    #[serde(default, deserialize_with = "nullable")]
    sd_volume_max: Option<Option<String>>,
    #[validate(length(max = 255))]
    main_cam_mp: Option<String>,
    #[validate(length(max = 255))]
    frontal_cam_mp: Option<String>,
}
