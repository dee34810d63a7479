//! SqliteMetadataStore — the `pictures` collection kept in SQLite.
//!
//! Records are written by the ingestion pipeline; this side only reads.

use super::{MetadataStore, StoreError, StoreResult};
use crate::models::picture::{PictureRecord, PictureRow};
use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, sync::Arc};

const INIT_MIGRATION: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Clone)]
pub struct SqliteMetadataStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl SqliteMetadataStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Open (creating if missing) the database at `url` and bring its schema
    /// up to date. The migrations are idempotent, so this runs on every start.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        run_migrations(&pool).await?;
        Ok(Self::new(Arc::new(pool)))
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn list_newest_first(&self) -> StoreResult<Vec<PictureRecord>> {
        let rows = sqlx::query_as::<_, PictureRow>(
            // julianday() normalizes UTC offsets; the raw text does not sort by instant.
            "SELECT name, labels, color, created FROM pictures ORDER BY julianday(created) DESC",
        )
        .fetch_all(&*self.db)
        .await?;

        rows.into_iter().map(record_from_row).collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        Ok(())
    }
}

fn record_from_row(row: PictureRow) -> StoreResult<PictureRecord> {
    let labels = serde_json::from_str::<Vec<String>>(&row.labels).map_err(|source| {
        StoreError::MalformedLabels {
            name: row.name.clone(),
            source,
        }
    })?;

    Ok(PictureRecord {
        name: row.name,
        labels,
        color: row.color,
        created: row.created,
    })
}

/// Run the embedded SQLite migrations.
pub async fn run_migrations(db: &SqlitePool) -> StoreResult<()> {
    let statements = INIT_MIGRATION
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}
