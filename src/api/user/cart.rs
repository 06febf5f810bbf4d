use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    ModelTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::entities::{
    cart, cart::Entity as CartEntity, cart_product, cart_product::Entity as CartProductEntity,
    customer, product_kind::ProductKind,
};
use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::services::{cart as carts, products};

//ROUTERS
pub fn cart_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/cart", get(get_cart).post(add_product))
        .route("/cart/checkout", post(checkout))
        .route("/cart/:id", patch(patch_entry).delete(remove_product))
        .layer(Extension(db))
}

//ROUTES
async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let customer = require_customer(&txn, claims.user_id).await?;
    let cart = carts::open_cart(&txn, customer.id).await?;
    let view = carts::cart_view(&txn, cart).await?;
    txn.commit().await?;

    Ok((StatusCode::OK, Json(view)).into_response())
}

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddProduct>,
) -> Result<Response, ApiError> {
    if payload.quantity == 0 {
        return Err(ApiError::BadRequest("Quantity should be greater than 0".into()));
    }

    let txn = db.begin().await?;
    let customer = require_customer(&txn, claims.user_id).await?;
    let product = products::find_by_slug(&txn, payload.kind, &payload.slug)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No {} with {} slug was found",
                payload.kind, payload.slug
            ))
        })?
        .summary();
    let cart = carts::open_cart(&txn, customer.id).await?;

    let existing = CartProductEntity::find()
        .filter(cart_product::Column::CartId.eq(cart.id))
        .filter(cart_product::Column::ProductKind.eq(product.kind))
        .filter(cart_product::Column::ObjectId.eq(product.id))
        .one(&txn)
        .await?;

    let status = match existing {
        Some(entry) => {
            let quantity = entry.quantity.saturating_add(payload.quantity);
            let mut entry: cart_product::ActiveModel = entry.into();
            entry.quantity = Set(quantity);
            entry.final_price = Set(products::check_total(carts::line_price(
                product.price,
                quantity,
            ))?);
            entry.update(&txn).await?;
            StatusCode::OK
        }
        None => {
            cart_product::ActiveModel {
                customer_id: Set(customer.id),
                cart_id: Set(cart.id),
                product_kind: Set(product.kind),
                object_id: Set(product.id),
                quantity: Set(payload.quantity),
                final_price: Set(products::check_total(carts::line_price(
                    product.price,
                    payload.quantity,
                ))?),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            StatusCode::CREATED
        }
    };

    let cart = carts::recalculate(&txn, cart.id).await?;
    products::check_total(cart.final_price)?;
    let view = carts::cart_view(&txn, cart).await?;
    txn.commit().await?;

    info!(
        customer_id = customer.id,
        kind = %product.kind,
        product_id = product.id,
        quantity = payload.quantity,
        "Added product to cart"
    );
    Ok((status, Json(view)).into_response())
}

async fn patch_entry(
    Path(id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchCart>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let customer = require_customer(&txn, claims.user_id).await?;
    let (entry, cart) = editable_entry(&txn, customer.id, id).await?;

    if payload.quantity == 0 {
        entry.delete(&txn).await?;
    } else {
        let product = products::find_summary(&txn, entry.product_kind, entry.object_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product is no longer available".into()))?;
        let mut entry: cart_product::ActiveModel = entry.into();
        entry.quantity = Set(payload.quantity);
        entry.final_price = Set(products::check_total(carts::line_price(
            product.price,
            payload.quantity,
        ))?);
        entry.update(&txn).await?;
    }

    let cart = carts::recalculate(&txn, cart.id).await?;
    products::check_total(cart.final_price)?;
    let view = carts::cart_view(&txn, cart).await?;
    txn.commit().await?;

    Ok((StatusCode::OK, Json(view)).into_response())
}

async fn remove_product(
    Path(id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let customer = require_customer(&txn, claims.user_id).await?;
    let (entry, cart) = editable_entry(&txn, customer.id, id).await?;

    entry.delete(&txn).await?;
    let cart = carts::recalculate(&txn, cart.id).await?;
    let view = carts::cart_view(&txn, cart).await?;
    txn.commit().await?;

    Ok((StatusCode::OK, Json(view)).into_response())
}

async fn checkout(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let customer = require_customer(&txn, claims.user_id).await?;
    let cart = carts::find_open_cart(&txn, customer.id)
        .await?
        .filter(|cart| cart.total_products > 0)
        .ok_or_else(|| ApiError::BadRequest("Cart is empty".into()))?;

    let mut ordered: cart::ActiveModel = cart.into();
    ordered.in_order = Set(true);
    let ordered = ordered.update(&txn).await?;
    let view = carts::cart_view(&txn, ordered).await?;
    txn.commit().await?;

    info!(
        customer_id = customer.id,
        cart_id = view.id,
        final_price = %view.final_price,
        "Cart ordered"
    );
    Ok((StatusCode::OK, Json(view)).into_response())
}

//HELPERS
async fn require_customer(
    txn: &DatabaseTransaction,
    user_id: i32,
) -> Result<customer::Model, ApiError> {
    carts::customer_for_user(txn, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No customer profile for this user".into()))
}

/// Line `id` of the customer, provided its cart has not been ordered yet.
async fn editable_entry(
    txn: &DatabaseTransaction,
    customer_id: i32,
    id: i32,
) -> Result<(cart_product::Model, cart::Model), ApiError> {
    let entry = CartProductEntity::find_by_id(id)
        .filter(cart_product::Column::CustomerId.eq(customer_id))
        .one(txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No related entry with {id} id was found.")))?;

    let cart = CartEntity::find_by_id(entry.cart_id)
        .one(txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No cart with {} id was found.", entry.cart_id)))?;
    if cart.in_order {
        return Err(ApiError::Conflict("Cart is already ordered".into()));
    }

    Ok((entry, cart))
}

//Structs
#[derive(Deserialize, Debug)]
struct AddProduct {
    kind: ProductKind,
    slug: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Deserialize)]
struct PatchCart {
    quantity: u32,
}
