use anyhow::{Context, Result};
use axum::Router;
use picture_frontend::{
    config::{AppConfig, ObjectBackend},
    routes,
    services::{
        MetadataStore, ObjectStore, local_store::LocalObjectStore,
        metadata_store::SqliteMetadataStore,
        s3_store::S3ObjectStore,
    },
    state::{AppState, Buckets},
};
use std::{io::ErrorKind, path::Path, sync::Arc};
use tokio::{fs, net::TcpListener};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::debug!("Starting picture-frontend with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    let db_url = &cfg.database_url;
    let db_path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    // Migrations are idempotent and run on every start.
    let metadata = SqliteMetadataStore::connect(db_url, 5)
        .await
        .with_context(|| format!("opening metadata database {}", db_url))?;
    tracing::info!("Database schema is up to date.");

    // --- Handle migration mode ---
    if migrate {
        return Ok(()); // exit after migration
    }

    // --- Ensure upload directory exists ---
    if !cfg.upload_dir.exists() {
        fs::create_dir_all(&cfg.upload_dir).await?;
        tracing::info!("Created upload directory at {}", cfg.upload_dir.display());
    }

    // --- Initialize clients ---
    let objects: Arc<dyn ObjectStore> = match cfg.object_backend {
        ObjectBackend::Local => {
            fs::create_dir_all(&cfg.object_store_dir).await?;
            Arc::new(LocalObjectStore::new(
                cfg.object_store_dir.clone(),
                cfg.storage_host.clone(),
            ))
        }
        ObjectBackend::S3 => Arc::new(
            S3ObjectStore::from_env(cfg.s3_endpoint_url.as_deref(), cfg.storage_host.clone())
                .await,
        ),
    };
    let pictures: Arc<dyn MetadataStore> = Arc::new(metadata);

    let state = AppState::new(
        objects,
        pictures,
        Buckets {
            pictures: cfg.pictures_bucket.clone(),
            thumbnails: cfg.thumbnails_bucket.clone(),
        },
        cfg.upload_dir.clone(),
    );

    // --- Build router ---
    let app: Router = routes::routes::routes(&cfg.static_dir, cfg.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Started web frontend service on port {}", cfg.port);
    tracing::info!("- Pictures bucket = {}", cfg.pictures_bucket);
    tracing::info!("- Thumbnails bucket = {}", cfg.thumbnails_bucket);
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
