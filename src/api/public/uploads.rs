use axum::routing::get;
use axum::{
    extract::{Extension, Path},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Router,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::config::Config;
use crate::entities::image::Entity as ImageEntity;
use crate::error::ApiError;

pub fn uploads_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/image/:id", get(print_image))
        .layer(Extension(db))
        .layer(Extension(config))
}

pub async fn print_image(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Response, ApiError> {
    let image = ImageEntity::find_by_id(id)
        .one(db.as_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Image not found with {id} id")))?;

    let path = config.upload_dir.join(image.stored_name());
    let file = tokio::fs::File::open(&path).await.map_err(|err| {
        warn!(image_id = id, path = %path.display(), error = %err, "Image file missing");
        ApiError::NotFound("Not found".into())
    })?;

    let content_type = mime_guess::from_path(&path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let stream = ReaderStream::new(file);
    let body = axum::body::Body::from_stream(stream);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("inline"),
    );

    Ok((headers, body).into_response())
}
