//! Shopping cart bookkeeping.
//!
//! `cart.total_products` and `cart.final_price` are denormalized from the line items;
//! every mutation of a line must be followed by [`recalculate`].

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::entities::{cart, cart_product, customer, product_kind::ProductKind};
use crate::services::products;

#[derive(Clone, Debug, Serialize)]
pub struct CartLineView {
    pub id: i32,
    pub kind: ProductKind,
    pub object_id: i32,
    pub title: Option<String>,
    pub url: Option<String>,
    pub label: String,
    pub quantity: u32,
    pub final_price: Decimal,
}

#[derive(Clone, Debug, Serialize)]
pub struct CartView {
    pub id: i32,
    pub owner_id: i32,
    pub total_products: u32,
    pub final_price: Decimal,
    pub in_order: bool,
    pub for_anonymous_user: bool,
    pub products: Vec<CartLineView>,
}

/// Snapshot price of a line.
pub fn line_price(unit_price: Decimal, quantity: u32) -> Decimal {
    (unit_price * Decimal::from(quantity)).round_dp(2)
}

/// `(number of lines, sum of line prices)`.
pub fn totals(lines: &[cart_product::Model]) -> (u32, Decimal) {
    let price = lines.iter().map(|line| line.final_price).sum::<Decimal>();
    (lines.len() as u32, price)
}

pub fn line_label(title: Option<&str>) -> String {
    format!("Product: {} (for cart)", title.unwrap_or("<removed>"))
}

pub async fn customer_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<customer::Model>, DbErr> {
    customer::Entity::find()
        .filter(customer::Column::UserId.eq(user_id))
        .one(db)
        .await
}

pub async fn find_open_cart<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
) -> Result<Option<cart::Model>, DbErr> {
    cart::Entity::find()
        .filter(cart::Column::OwnerId.eq(customer_id))
        .filter(cart::Column::InOrder.eq(false))
        .one(db)
        .await
}

/// The customer's open cart, created empty when there is none.
pub async fn open_cart<C: ConnectionTrait>(db: &C, customer_id: i32) -> Result<cart::Model, DbErr> {
    if let Some(cart) = find_open_cart(db, customer_id).await? {
        return Ok(cart);
    }

    cart::ActiveModel {
        owner_id: Set(customer_id),
        total_products: Set(0),
        final_price: Set(Decimal::ZERO),
        in_order: Set(false),
        for_anonymous_user: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn lines<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
) -> Result<Vec<cart_product::Model>, DbErr> {
    cart_product::Entity::find()
        .filter(cart_product::Column::CartId.eq(cart_id))
        .order_by_asc(cart_product::Column::Id)
        .all(db)
        .await
}

/// Rewrites the cart totals from its current lines.
pub async fn recalculate<C: ConnectionTrait>(db: &C, cart_id: i32) -> Result<cart::Model, DbErr> {
    let lines = lines(db, cart_id).await?;
    let (total_products, final_price) = totals(&lines);

    cart::ActiveModel {
        id: Set(cart_id),
        total_products: Set(total_products),
        final_price: Set(final_price),
        ..Default::default()
    }
    .update(db)
    .await
}

/// Deletes the open-cart lines pointing at one of `ids` of `kind` and fixes those carts.
/// Lines of ordered carts stay as they are. Must run before the products are deleted.
pub async fn remove_lines_for_products<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
    ids: &[i32],
) -> Result<(), DbErr> {
    if ids.is_empty() {
        return Ok(());
    }

    let lines = cart_product::Entity::find()
        .filter(cart_product::Column::ProductKind.eq(kind))
        .filter(cart_product::Column::ObjectId.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    if lines.is_empty() {
        return Ok(());
    }

    let open: BTreeSet<i32> = cart::Entity::find()
        .select_only()
        .column(cart::Column::Id)
        .filter(cart::Column::Id.is_in(lines.iter().map(|line| line.cart_id)))
        .filter(cart::Column::InOrder.eq(false))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    let affected: Vec<&cart_product::Model> = lines
        .iter()
        .filter(|line| open.contains(&line.cart_id))
        .collect();
    if affected.is_empty() {
        return Ok(());
    }

    let carts: BTreeSet<i32> = affected.iter().map(|line| line.cart_id).collect();
    cart_product::Entity::delete_many()
        .filter(cart_product::Column::Id.is_in(affected.iter().map(|line| line.id)))
        .exec(db)
        .await?;

    for cart_id in carts {
        recalculate(db, cart_id).await?;
    }
    Ok(())
}

pub async fn cart_view<C: ConnectionTrait>(db: &C, cart: cart::Model) -> Result<CartView, DbErr> {
    let mut views = Vec::new();
    for line in lines(db, cart.id).await? {
        let product = products::find_summary(db, line.product_kind, line.object_id).await?;
        let title = product.as_ref().map(|p| p.title.clone());
        views.push(CartLineView {
            id: line.id,
            kind: line.product_kind,
            object_id: line.object_id,
            label: line_label(title.as_deref()),
            url: product.map(|p| p.url),
            title,
            quantity: line.quantity,
            final_price: line.final_price,
        });
    }

    Ok(CartView {
        id: cart.id,
        owner_id: cart.owner_id,
        total_products: cart.total_products,
        final_price: cart.final_price,
        in_order: cart.in_order,
        for_anonymous_user: cart.for_anonymous_user,
        products: views,
    })
}
