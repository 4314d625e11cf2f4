pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};

use crate::config::{Config, StorageBackend};
use crate::routes::AppState;
use crate::services::catalog::MediaCatalog;
use crate::services::storage::{BlobStore, LocalBlobStore, S3BlobStore};

/// Connects to the database, applies pending migrations and prepares the blob store.
pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;

    let store: Arc<dyn BlobStore> = match &config.storage {
        StorageBackend::Local => Arc::new(
            LocalBlobStore::new(&config.upload_dir, config.public_base_url.clone()).await?,
        ),
        StorageBackend::S3(s3) => Arc::new(S3BlobStore::new(s3)),
    };

    tracing::info!(
        backend = match config.storage {
            StorageBackend::Local => "local",
            StorageBackend::S3(_) => "s3",
        },
        "storage ready"
    );

    Ok(AppState {
        catalog: MediaCatalog::new(db.clone(), store),
        db,
        config: Arc::new(config),
    })
}
