use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::entities::{cart, customer, user};
use crate::error::ApiError;
use crate::services::cart::{cart_view, CartView};

//ROUTERS
pub fn admin_listing_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/customer", get(list_customers))
        .route("/cart", get(list_carts))
        .layer(Extension(db))
}

//ROUTES
async fn list_customers(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let rows = customer::Entity::find()
        .find_also_related(user::Entity)
        .order_by_asc(customer::Column::Id)
        .all(&txn)
        .await?;

    let customers: Vec<CustomerListing> = rows
        .into_iter()
        .filter_map(|(customer, user)| user.map(|user| CustomerListing::new(customer, user)))
        .collect();
    debug!(count = customers.len(), "Customers listed");
    txn.commit().await?;
    Ok((StatusCode::OK, Json(customers)).into_response())
}

async fn list_carts(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let carts = cart::Entity::find()
        .order_by_asc(cart::Column::Id)
        .all(&txn)
        .await?;

    let mut views: Vec<CartView> = Vec::with_capacity(carts.len());
    for cart in carts {
        views.push(cart_view(&txn, cart).await?);
    }
    txn.commit().await?;
    Ok((StatusCode::OK, Json(views)).into_response())
}

//Structs
#[derive(Serialize)]
struct CustomerListing {
    id: i32,
    user_id: i32,
    username: String,
    label: String,
    phone: String,
    address: String,
}

impl CustomerListing {
    fn new(customer: customer::Model, user: user::Model) -> Self {
        CustomerListing {
            label: customer::label(&user),
            id: customer.id,
            user_id: customer.user_id,
            username: user.username,
            phone: customer.phone,
            address: customer.address,
        }
    }
}
