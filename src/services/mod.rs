//! Clients for the two external collaborators: the object store holding the
//! picture and thumbnail buckets, and the metadata store holding the
//! `pictures` collection.
//!
//! Both are traits so handlers receive them through `AppState` and tests can
//! swap in in-memory fakes.

pub mod local_store;
pub mod metadata_store;
pub mod s3_store;

use crate::models::picture::PictureRecord;
use async_trait::async_trait;
use std::{io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid object name `{0}`")]
    InvalidObjectName(String),
    #[error("record `{name}` has malformed labels: {source}")]
    MalformedLabels {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("upstream storage error: {0}")]
    Upstream(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Uploads objects into named buckets and builds their public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Copy the local file at `path` into `bucket` under `name` in one
    /// non-resumable write. An existing object of the same name is replaced.
    async fn upload_file(
        &self,
        bucket: &str,
        name: &str,
        path: &Path,
        content_type: Option<&str>,
    ) -> StoreResult<()>;

    /// Public URL of `name` in `bucket`. Never checks that the object exists.
    fn public_url(&self, bucket: &str, name: &str) -> String;
}

/// Read access to the `pictures` collection.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Every record, newest `created` first.
    async fn list_newest_first(&self) -> StoreResult<Vec<PictureRecord>>;

    /// Cheap connectivity check used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;
}

/// `https://storage.<host>/<bucket>/<name>`, with no escaping of `name`.
pub fn storage_url(host: &str, bucket: &str, name: &str) -> String {
    format!("https://storage.{}/{}/{}", host, bucket, name)
}
