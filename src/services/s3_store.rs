//! S3ObjectStore — uploads through the S3 API.
//!
//! Works against AWS or any S3-compatible endpoint, including the Cloud
//! Storage interoperability API when `endpoint_url` points there.

use super::{ObjectStore, StoreError, StoreResult, storage_url};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client, primitives::ByteStream};
use std::path::Path;
use tracing::{error, info};

pub struct S3ObjectStore {
    client: Client,
    public_host: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, public_host: impl Into<String>) -> Self {
        Self {
            client,
            public_host: public_host.into(),
        }
    }

    /// Build a client from the ambient AWS configuration (env, profile, IMDS).
    ///
    /// A custom `endpoint_url` switches to path-style addressing.
    pub async fn from_env(endpoint_url: Option<&str>, public_host: impl Into<String>) -> Self {
        let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        info!(
            "Initialized S3 object store client (endpoint: {})",
            endpoint_url.unwrap_or("default")
        );

        Self::new(client, public_host)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload_file(
        &self,
        bucket: &str,
        name: &str,
        path: &Path,
        content_type: Option<&str>,
    ) -> StoreResult<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|err| StoreError::Upstream(format!("reading {}: {}", path.display(), err)))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(name)
            .set_content_type(content_type.map(str::to_string))
            .body(body)
            .send()
            .await
            .map_err(|err| {
                error!("Failed to upload {} to bucket {}: {}", name, bucket, err);
                StoreError::Upstream(err.to_string())
            })?;

        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        storage_url(&self.public_host, bucket, name)
    }
}
