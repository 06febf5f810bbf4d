//! Registry of concrete product tables.
//!
//! A cart line points at a product through `(ProductKind, row id)`, so this tag is the
//! only place that knows which tables hold products.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, EnumIter, DeriveActiveEnum,
    Serialize, Deserialize,
)]
#[sea_orm(
    enum_name = "product_kind_enum",
    db_type = "String(StringLen::N(32))",
    rs_type = "String"
)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[sea_orm(string_value = "notebook")]
    Notebook,
    #[sea_orm(string_value = "smartphone")]
    Smartphone,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown product kind: {0}")]
pub struct UnknownKind(pub String);

impl ProductKind {
    /// Every kind in registry order.
    pub const ALL: [ProductKind; 2] = [ProductKind::Notebook, ProductKind::Smartphone];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Notebook => "notebook",
            ProductKind::Smartphone => "smartphone",
        }
    }

    /// Slug of the only category the admin may put products of this kind in.
    pub fn admin_category_slug(&self) -> &'static str {
        match self {
            ProductKind::Notebook => "notebooks",
            ProductKind::Smartphone => "smartphones",
        }
    }

    pub fn product_url(&self, slug: &str) -> String {
        format!("/products/{}/{}", self.as_str(), slug)
    }
}

impl FromStr for ProductKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_resolve_to_kinds() {
        assert_eq!("notebook".parse(), Ok(ProductKind::Notebook));
        assert_eq!("smartphone".parse(), Ok(ProductKind::Smartphone));
        assert_eq!(
            "tablet".parse::<ProductKind>(),
            Err(UnknownKind("tablet".into()))
        );
    }

    #[test]
    fn product_url_contains_kind_and_slug() {
        assert_eq!(
            ProductKind::Smartphone.product_url("pixel-8"),
            "/products/smartphone/pixel-8"
        );
    }
}
