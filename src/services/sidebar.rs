use sea_orm::{
    sea_query::Expr, ConnectionTrait, DbErr, EntityTrait, QueryOrder, QuerySelect,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::entities::{category, notebook, smartphone};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub notebook: u64,
    pub smartphone: u64,
}

impl KindCounts {
    pub fn total(&self) -> u64 {
        self.notebook + self.smartphone
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SidebarCategory {
    pub name: String,
    pub slug: String,
    pub url: String,
    pub counts: KindCounts,
    pub count: u64,
}

pub fn build_sidebar(
    categories: Vec<category::Model>,
    notebooks: &HashMap<i32, i64>,
    smartphones: &HashMap<i32, i64>,
) -> Vec<SidebarCategory> {
    let count_of = |counts: &HashMap<i32, i64>, id: i32| {
        counts.get(&id).copied().unwrap_or(0).max(0) as u64
    };

    categories
        .into_iter()
        .map(|category| {
            let counts = KindCounts {
                notebook: count_of(notebooks, category.id),
                smartphone: count_of(smartphones, category.id),
            };
            SidebarCategory {
                url: category.url(),
                name: category.name,
                slug: category.slug,
                count: counts.total(),
                counts,
            }
        })
        .collect()
}

/// Every category with the live number of products of each kind filed under it.
pub async fn categories_for_sidebar<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<SidebarCategory>, DbErr> {
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Id)
        .all(db)
        .await?;

    let notebooks: HashMap<i32, i64> = notebook::Entity::find()
        .select_only()
        .column(notebook::Column::CategoryId)
        .column_as(Expr::col(notebook::Column::Id).count(), "count")
        .group_by(notebook::Column::CategoryId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let smartphones: HashMap<i32, i64> = smartphone::Entity::find()
        .select_only()
        .column(smartphone::Column::CategoryId)
        .column_as(Expr::col(smartphone::Column::Id).count(), "count")
        .group_by(smartphone::Column::CategoryId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(build_sidebar(categories, &notebooks, &smartphones))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i32, slug: &str) -> category::Model {
        category::Model {
            id,
            name: slug.to_uppercase(),
            slug: slug.into(),
        }
    }

    #[test]
    fn counts_are_reported_per_kind_and_summed() {
        let notebooks = HashMap::from([(1, 3)]);
        let smartphones = HashMap::from([(1, 1), (2, 4)]);

        let sidebar = build_sidebar(
            vec![category(1, "notebooks"), category(2, "smartphones"), category(3, "empty")],
            &notebooks,
            &smartphones,
        );

        assert_eq!(sidebar[0].counts, KindCounts { notebook: 3, smartphone: 1 });
        assert_eq!(sidebar[0].count, 4);
        assert_eq!(sidebar[1].count, 4);
        assert_eq!(sidebar[2].count, 0);
        assert_eq!(sidebar[2].url, "/category/empty");
    }
}
