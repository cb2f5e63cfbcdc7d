use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use common::storage::BlobStore;
use common::storage::filesystem::FilesystemBlobStore;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{Level, info, warn};

use docvault::auth::{CredentialStore, InMemoryCredentialStore};
use docvault::config::{AppConfig, CorsConfig};
use docvault::database::init_db;
use docvault::ingest::REVISIONS_NAMESPACE;
use docvault::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to initialize database")?;
    info!(url = %config.database.url, "Database ready");

    let blob_store = FilesystemBlobStore::new(
        config.storage.content_root.clone(),
        config.storage.max_blob_size,
    )
    .await
    .context("Failed to initialize blob store")?
    .with_write_timeout(config.storage.write_timeout());
    let revision_store = blob_store
        .namespace(REVISIONS_NAMESPACE)
        .await
        .context("Failed to initialize revision store")?;
    info!(
        content_root = %blob_store.base_path().display(),
        revisions = %revision_store.base_path().display(),
        max_blob_size = config.storage.max_blob_size,
        "Blob store ready"
    );

    let credentials: Option<Arc<dyn CredentialStore>> = if config.auth.enabled {
        let store = InMemoryCredentialStore::new(&config.auth.username, &config.auth.password)
            .context("Failed to set up credentials")?;
        Some(Arc::new(store))
    } else {
        warn!("Authentication is disabled, all requests run as anonymous");
        None
    };

    let cors = cors_layer(&config.server.cors);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        blob_store: Arc::new(blob_store) as Arc<dyn BlobStore>,
        revision_store: Arc::new(revision_store) as Arc<dyn BlobStore>,
        credentials,
        config,
    };

    let app = docvault::build_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
}
