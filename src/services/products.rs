//! Lookups that span every product table.

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;

use crate::entities::{category, image, notebook, product_kind::ProductKind, smartphone};
use crate::error::ApiError;

/// Largest price a `Decimal(9, 2)` column holds.
const MAX_PRICE: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 2);

/// Fields shared by every kind of product.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductSummary {
    pub kind: ProductKind,
    pub id: i32,
    pub category_id: i32,
    pub title: String,
    pub slug: String,
    pub image_id: i32,
    pub price: Decimal,
    pub url: String,
}

impl From<notebook::Model> for ProductSummary {
    fn from(value: notebook::Model) -> Self {
        ProductSummary {
            kind: ProductKind::Notebook,
            url: ProductKind::Notebook.product_url(&value.slug),
            id: value.id,
            category_id: value.category_id,
            title: value.title,
            slug: value.slug,
            image_id: value.image_id,
            price: value.price,
        }
    }
}

impl From<smartphone::Model> for ProductSummary {
    fn from(value: smartphone::Model) -> Self {
        ProductSummary {
            kind: ProductKind::Smartphone,
            url: ProductKind::Smartphone.product_url(&value.slug),
            id: value.id,
            category_id: value.category_id,
            title: value.title,
            slug: value.slug,
            image_id: value.image_id,
            price: value.price,
        }
    }
}

/// Full row of one product, tagged with its kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProductDetail {
    Notebook(notebook::Model),
    Smartphone(smartphone::Model),
}

impl ProductDetail {
    pub fn summary(&self) -> ProductSummary {
        match self {
            ProductDetail::Notebook(model) => model.clone().into(),
            ProductDetail::Smartphone(model) => model.clone().into(),
        }
    }
}

/// Product as the admin sees it.
#[derive(Clone, Debug, Serialize)]
pub struct AdminProduct {
    pub product: ProductDetail,
    pub label: String,
    pub url: String,
}

impl AdminProduct {
    pub fn new(product: ProductDetail, category: &category::Model) -> Self {
        let summary = product.summary();
        AdminProduct {
            label: label(category, &summary.title),
            url: summary.url,
            product,
        }
    }
}

/// `"{category} : {title}"`, how products are listed in the admin.
pub fn label(category: &category::Model, title: &str) -> String {
    format!("{} : {}", category.name, title)
}

pub async fn find_by_slug<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
    slug: &str,
) -> Result<Option<ProductDetail>, DbErr> {
    Ok(match kind {
        ProductKind::Notebook => notebook::Entity::find()
            .filter(notebook::Column::Slug.eq(slug))
            .one(db)
            .await?
            .map(ProductDetail::Notebook),
        ProductKind::Smartphone => smartphone::Entity::find()
            .filter(smartphone::Column::Slug.eq(slug))
            .one(db)
            .await?
            .map(ProductDetail::Smartphone),
    })
}

/// Resolves a polymorphic `(kind, id)` reference.
pub async fn find_summary<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
    id: i32,
) -> Result<Option<ProductSummary>, DbErr> {
    Ok(match kind {
        ProductKind::Notebook => notebook::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Into::into),
        ProductKind::Smartphone => smartphone::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Into::into),
    })
}

/// The `limit` newest rows of one kind, newest first.
pub async fn latest_of_kind<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
    limit: u64,
) -> Result<Vec<ProductSummary>, DbErr> {
    Ok(match kind {
        ProductKind::Notebook => notebook::Entity::find()
            .order_by_desc(notebook::Column::Id)
            .limit(limit)
            .all(db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
        ProductKind::Smartphone => smartphone::Entity::find()
            .order_by_desc(smartphone::Column::Id)
            .limit(limit)
            .all(db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
    })
}

pub async fn in_category<C: ConnectionTrait>(
    db: &C,
    category_id: i32,
) -> Result<Vec<ProductSummary>, DbErr> {
    let mut products: Vec<ProductSummary> = notebook::Entity::find()
        .filter(notebook::Column::CategoryId.eq(category_id))
        .order_by_asc(notebook::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    products.extend(
        smartphone::Entity::find()
            .filter(smartphone::Column::CategoryId.eq(category_id))
            .order_by_asc(smartphone::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(ProductSummary::from),
    );

    Ok(products)
}

pub async fn ids_in_category<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
    category_id: i32,
) -> Result<Vec<i32>, DbErr> {
    match kind {
        ProductKind::Notebook => {
            notebook::Entity::find()
                .select_only()
                .column(notebook::Column::Id)
                .filter(notebook::Column::CategoryId.eq(category_id))
                .into_tuple::<i32>()
                .all(db)
                .await
        }
        ProductKind::Smartphone => {
            smartphone::Entity::find()
                .select_only()
                .column(smartphone::Column::Id)
                .filter(smartphone::Column::CategoryId.eq(category_id))
                .into_tuple::<i32>()
                .all(db)
                .await
        }
    }
}

pub async fn delete_in_category<C: ConnectionTrait>(db: &C, category_id: i32) -> Result<u64, DbErr> {
    let notebooks = notebook::Entity::delete_many()
        .filter(notebook::Column::CategoryId.eq(category_id))
        .exec(db)
        .await?;
    let smartphones = smartphone::Entity::delete_many()
        .filter(smartphone::Column::CategoryId.eq(category_id))
        .exec(db)
        .await?;
    Ok(notebooks.rows_affected + smartphones.rows_affected)
}

/// True when a product of `kind` other than `except_id` already uses `slug`.
pub async fn slug_taken<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
    slug: &str,
    except_id: Option<i32>,
) -> Result<bool, DbErr> {
    let found = match kind {
        ProductKind::Notebook => notebook::Entity::find()
            .filter(notebook::Column::Slug.eq(slug))
            .one(db)
            .await?
            .map(|model| model.id),
        ProductKind::Smartphone => smartphone::Entity::find()
            .filter(smartphone::Column::Slug.eq(slug))
            .one(db)
            .await?
            .map(|model| model.id),
    };
    Ok(matches!(found, Some(id) if Some(id) != except_id))
}

pub async fn image_in_use<C: ConnectionTrait>(db: &C, image_id: i32) -> Result<bool, DbErr> {
    let notebooks = notebook::Entity::find()
        .filter(notebook::Column::ImageId.eq(image_id))
        .count(db)
        .await?;
    let smartphones = smartphone::Entity::find()
        .filter(smartphone::Column::ImageId.eq(image_id))
        .count(db)
        .await?;
    Ok(notebooks + smartphones > 0)
}

/// Categories the admin may pick for products of `kind`.
pub async fn category_choices<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
) -> Result<Vec<category::Model>, DbErr> {
    category::Entity::find()
        .filter(category::Column::Slug.eq(kind.admin_category_slug()))
        .all(db)
        .await
}

pub async fn category_of<C: ConnectionTrait>(
    db: &C,
    category_id: i32,
) -> Result<category::Model, ApiError> {
    category::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Category {category_id} is missing")))
}

/// Loads the category and checks that products of `kind` may be placed in it.
pub async fn allowed_category<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
    category_id: i32,
) -> Result<category::Model, ApiError> {
    category::Entity::find_by_id(category_id)
        .filter(category::Column::Slug.eq(kind.admin_category_slug()))
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Category {category_id} is not available for {kind} products"
            ))
        })
}

pub async fn ensure_image<C: ConnectionTrait>(db: &C, image_id: i32) -> Result<(), ApiError> {
    image::Entity::find_by_id(image_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::BadRequest(format!("No image with {image_id} id was found")))
}

pub fn check_price(price: Decimal) -> Result<Decimal, ApiError> {
    if price.is_sign_negative() {
        return Err(ApiError::BadRequest("Price must not be negative".into()));
    }
    if price.scale() > 2 && price.normalize().scale() > 2 {
        return Err(ApiError::BadRequest(
            "Price must have at most two decimal places".into(),
        ));
    }
    if price > MAX_PRICE {
        return Err(ApiError::BadRequest(format!("Price must not exceed {MAX_PRICE}")));
    }
    Ok(price.round_dp(2))
}

/// Rejects line or cart totals that would not fit the `Decimal(9, 2)` money columns.
pub fn check_total(total: Decimal) -> Result<Decimal, ApiError> {
    if total > MAX_PRICE {
        return Err(ApiError::BadRequest(format!(
            "Total price must not exceed {MAX_PRICE}"
        )));
    }
    Ok(total)
}
