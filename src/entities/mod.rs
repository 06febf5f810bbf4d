pub mod cart;
pub mod cart_product;
pub mod category;
pub mod customer;
pub mod image;
pub mod notebook;
pub mod product_kind;
pub mod smartphone;
pub mod user;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Schema, Set, TransactionTrait,
};
use tracing::info;

use crate::config::Config;
use crate::entities::product_kind::ProductKind;
use crate::StartupError;

macro_rules! create_tables {
    ($db:expr, $schema:expr, $($entity:expr),+ $(,)?) => {
        $(
            let mut statement = $schema.create_table_from_entity($entity);
            statement.if_not_exists();
            $db.execute($db.get_database_backend().build(&statement)).await?;
        )+
    };
}

/// Creates every table that does not exist yet. Referenced tables come first.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());
    create_tables!(
        db,
        schema,
        user::Entity,
        image::Entity,
        category::Entity,
        customer::Entity,
        notebook::Entity,
        smartphone::Entity,
        cart::Entity,
        cart_product::Entity,
    );
    Ok(())
}

/// Seeds the `admin` and `user` accounts and the per-kind categories. Safe to rerun.
pub async fn primary_setup(db: &DatabaseConnection, config: &Config) -> Result<(), StartupError> {
    let txn = db.begin().await?;

    if user::Entity::find()
        .filter(user::Column::Username.eq("admin"))
        .one(&txn)
        .await?
        .is_none()
    {
        user::ActiveModel {
            username: Set("admin".to_owned()),
            password: Set(hash(&config.admin_password)?),
            first_name: Set("Site".to_owned()),
            last_name: Set("Administrator".to_owned()),
            role: Set(user::Role::Admin),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        info!("Seeded admin account");
    }

    if user::Entity::find()
        .filter(user::Column::Username.eq("user"))
        .one(&txn)
        .await?
        .is_none()
    {
        let user = user::ActiveModel {
            username: Set("user".to_owned()),
            password: Set(hash(&config.user_password)?),
            first_name: Set("Demo".to_owned()),
            last_name: Set("Customer".to_owned()),
            role: Set(user::Role::User),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        customer::ActiveModel {
            user_id: Set(user.id),
            phone: Set(String::new()),
            address: Set(String::new()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        info!("Seeded demo customer account");
    }

    for kind in ProductKind::ALL {
        let slug = kind.admin_category_slug();
        if category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&txn)
            .await?
            .is_none()
        {
            category::ActiveModel {
                name: Set(default_category_name(kind).to_owned()),
                slug: Set(slug.to_owned()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            info!(slug, "Seeded category");
        }
    }

    txn.commit().await?;
    Ok(())
}

fn default_category_name(kind: ProductKind) -> &'static str {
    match kind {
        ProductKind::Notebook => "Notebooks",
        ProductKind::Smartphone => "Smartphones",
    }
}

fn hash(password: &str) -> Result<String, StartupError> {
    user::hash_password(password).map_err(|err| StartupError::Seed(err.to_string()))
}
