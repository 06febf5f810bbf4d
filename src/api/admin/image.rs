use axum::{
    extract::{DefaultBodyLimit, Extension, Multipart, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::entities::{image, image::Entity as ImageEntity, image::FileExtension};
use crate::error::ApiError;
use crate::services::products::image_in_use;

static FILE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,25}$").unwrap());

/// Room left for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

//ROUTERS
pub fn admin_image_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    let body_limit = config.max_image_size + MULTIPART_OVERHEAD;
    Router::new()
        .route("/image", post(upload).get(get_images))
        .route("/image/:id", delete(delete_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(db))
        .layer(Extension(config))
}

//ROUTES
async fn upload(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
        .ok_or_else(|| ApiError::BadRequest("No file was sent.".into()))?;

    let content_type = field
        .content_type()
        .ok_or_else(|| ApiError::BadRequest("Content type is not set.".into()))?;
    let extension = FileExtension::from_content_type(content_type)
        .ok_or_else(|| ApiError::BadRequest("Unsupported content type.".into()))?;

    let file_name = field
        .name()
        .ok_or_else(|| ApiError::BadRequest("File name is not set.".into()))?
        .to_owned();
    if !FILE_NAME_REGEX.is_match(&file_name) {
        return Err(ApiError::BadRequest(
            "Invalid file name. It should contain 3 to 25 Latin letters, numbers or '_'.".into(),
        ));
    }

    let data = field.bytes().await.map_err(ApiError::from_multipart)?;
    if data.len() > config.max_image_size {
        return Err(ApiError::PayloadTooLarge);
    }

    let txn = db.begin().await?;
    let taken = ImageEntity::find()
        .filter(image::Column::FileName.eq(file_name.as_str()))
        .one(&txn)
        .await?
        .is_some();
    if taken {
        return Err(ApiError::Conflict(format!("Image {file_name} already exists")));
    }

    let image = image::ActiveModel {
        file_name: Set(file_name),
        path_name: Set(Uuid::new_v4().to_string()),
        extension: Set(extension),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // The row is only committed once the file is on disk; either failure removes the file.
    let path = config.upload_dir.join(image.stored_name());
    let stored = match tokio::fs::write(&path, &data).await {
        Ok(()) => txn.commit().await.map_err(ApiError::from),
        Err(err) => Err(ApiError::Internal(format!(
            "Failed to write {}: {err}",
            path.display()
        ))),
    };
    if let Err(err) = stored {
        discard_file(&path).await;
        return Err(err);
    }

    info!(image_id = image.id, file_name = %image.file_name, size = data.len(), "Image uploaded");
    Ok((StatusCode::CREATED, Json(image)).into_response())
}

/// Lists images; `query` matches a part of the file name or an exact id.
async fn get_images(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Query(query): Query<ImagesQuery>,
) -> Result<Response, ApiError> {
    let mut filter = Condition::all();
    if let Some(query) = query.query.filter(|query| !query.is_empty()) {
        let mut matches = Condition::any().add(image::Column::FileName.contains(query.as_str()));
        if let Ok(id) = query.parse::<i32>() {
            matches = matches.add(image::Column::Id.eq(id));
        }
        filter = filter.add(matches);
    }

    let images = ImageEntity::find()
        .filter(filter)
        .order_by_asc(image::Column::Id)
        .all(db.as_ref())
        .await?;
    Ok((StatusCode::OK, Json(images)).into_response())
}

async fn delete_image(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let image = ImageEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No image with id {id} was found.")))?;

    if image_in_use(&txn, id).await? {
        return Err(ApiError::Conflict(format!(
            "Image {id} is still used by a product"
        )));
    }

    let path = config.upload_dir.join(image.stored_name());
    image.delete(&txn).await?;
    txn.commit().await?;

    discard_file(&path).await;

    info!(image_id = id, "Image deleted");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Resource deleted successfully."
        })),
    )
        .into_response())
}

//HELPERS
async fn discard_file(path: &std::path::Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), error = %err, "Image file was not removed"),
    }
}

//Structs
#[derive(Deserialize)]
struct ImagesQuery {
    query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_pattern() {
        assert!(FILE_NAME_REGEX.is_match("laptop_01"));
        assert!(!FILE_NAME_REGEX.is_match("ab"));
        assert!(!FILE_NAME_REGEX.is_match("with-dash"));
        assert!(!FILE_NAME_REGEX.is_match("a_very_long_file_name_over_25"));
    }
}
