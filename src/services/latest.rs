//! Main page feed: the newest products of several kinds in one list.

use sea_orm::{ConnectionTrait, DbErr};

use crate::entities::product_kind::ProductKind;
use crate::services::products::{self, ProductSummary};

pub const LATEST_PER_KIND: u64 = 5;

/// Requested model names that exist in the registry, in registry order.
pub fn resolve_kinds<S: AsRef<str>>(names: &[S]) -> Vec<ProductKind> {
    ProductKind::ALL
        .into_iter()
        .filter(|kind| names.iter().any(|name| name.as_ref() == kind.as_str()))
        .collect()
}

/// Moves products of `preferred` to the front, keeping the relative order otherwise.
/// Only applies when `preferred` is one of the requested kinds.
pub fn with_respect_to(
    mut products: Vec<ProductSummary>,
    kinds: &[ProductKind],
    preferred: Option<ProductKind>,
) -> Vec<ProductSummary> {
    if let Some(preferred) = preferred.filter(|kind| kinds.contains(kind)) {
        products.sort_by_key(|product| product.kind != preferred);
    }
    products
}

pub async fn latest_products<C, S>(
    db: &C,
    names: &[S],
    preferred: Option<&str>,
) -> Result<Vec<ProductSummary>, DbErr>
where
    C: ConnectionTrait,
    S: AsRef<str>,
{
    let kinds = resolve_kinds(names);
    let mut collected = Vec::new();
    for kind in &kinds {
        collected.extend(products::latest_of_kind(db, *kind, LATEST_PER_KIND).await?);
    }

    let preferred = preferred.and_then(|name| name.parse::<ProductKind>().ok());
    Ok(with_respect_to(collected, &kinds, preferred))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(kind: ProductKind, id: i32) -> ProductSummary {
        let slug = format!("{kind}-{id}");
        ProductSummary {
            kind,
            id,
            category_id: 1,
            title: slug.clone(),
            url: kind.product_url(&slug),
            slug,
            image_id: 1,
            price: Decimal::ONE,
        }
    }

    fn ids(products: &[ProductSummary]) -> Vec<(ProductKind, i32)> {
        products.iter().map(|p| (p.kind, p.id)).collect()
    }

    #[test]
    fn unknown_names_are_ignored_and_registry_order_wins() {
        assert_eq!(
            resolve_kinds(&["smartphone", "tablet", "notebook"]),
            vec![ProductKind::Notebook, ProductKind::Smartphone]
        );
        assert!(resolve_kinds(&["tv"]).is_empty());
    }

    #[test]
    fn preferred_kind_moves_to_front_stably() {
        let products = vec![
            product(ProductKind::Notebook, 9),
            product(ProductKind::Notebook, 4),
            product(ProductKind::Smartphone, 7),
            product(ProductKind::Smartphone, 2),
        ];
        let kinds = [ProductKind::Notebook, ProductKind::Smartphone];

        let ordered = with_respect_to(products, &kinds, Some(ProductKind::Smartphone));

        assert_eq!(
            ids(&ordered),
            vec![
                (ProductKind::Smartphone, 7),
                (ProductKind::Smartphone, 2),
                (ProductKind::Notebook, 9),
                (ProductKind::Notebook, 4),
            ]
        );
    }

    #[test]
    fn preferred_kind_outside_request_keeps_order() {
        let products = vec![product(ProductKind::Notebook, 3), product(ProductKind::Notebook, 1)];

        let ordered = with_respect_to(
            products.clone(),
            &[ProductKind::Notebook],
            Some(ProductKind::Smartphone),
        );

        assert_eq!(ordered, products);
    }
}
