use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gadget_shop::{config::Config, create_app, init_database, StartupError};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let db = init_database(&config).await?;
    let app = create_app(Arc::new(db), Arc::new(config.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Running");
    axum::serve(listener, app).await?;
    Ok(())
}
