//! LocalObjectStore — buckets as directories on local disk.
//!
//! Objects are sharded beneath `base_path/{bucket}/{shard}/{shard}/{name}` so
//! no single directory grows unbounded. Public URLs still point at the
//! configured storage host, the same way they would for a managed bucket.

use super::{ObjectStore, StoreError, StoreResult, storage_url};
use async_trait::async_trait;
use std::{
    io::{self, ErrorKind},
    path::{Component, Path, PathBuf},
};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

const MAX_OBJECT_NAME_LEN: usize = 1024;

#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    /// Base directory on disk where bucket folders live.
    pub base_path: PathBuf,

    /// Host used when building public URLs.
    pub public_host: String,
}

impl LocalObjectStore {
    pub fn new(base_path: impl Into<PathBuf>, public_host: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_host: public_host.into(),
        }
    }

    /// Rejects names that would escape the bucket directory.
    ///
    /// Only guards the local layout; the public URL is built from the raw name.
    /// Dots inside a name (`cat..png`) are fine; only `.`/`..` components are not.
    fn ensure_name_safe(name: &str) -> StoreResult<()> {
        if name.is_empty()
            || name.len() > MAX_OBJECT_NAME_LEN
            || name.starts_with('/')
            || Path::new(name)
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::CurDir))
            || name
                .bytes()
                .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(StoreError::InvalidObjectName(name.to_string()));
        }
        Ok(())
    }

    fn bucket_root(&self, bucket: &str) -> PathBuf {
        self.base_path.join(bucket)
    }

    /// Two-level shard identifiers from MD5(bucket/name), as lowercase hex.
    fn object_shards(bucket: &str, name: &str) -> (String, String) {
        let digest = md5::compute(format!("{}/{}", bucket, name));
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    /// Where the payload of `name` lives. Parent directories may not exist yet.
    pub fn object_path(&self, bucket: &str, name: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::object_shards(bucket, name);
        let mut path = self.bucket_root(bucket);
        path.push(shard_a);
        path.push(shard_b);
        path.push(name);
        path
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload_file(
        &self,
        bucket: &str,
        name: &str,
        path: &Path,
        _content_type: Option<&str>,
    ) -> StoreResult<()> {
        Self::ensure_name_safe(name)?;

        let file_path = self.object_path(bucket, name);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StoreError::Io(io::Error::new(
                ErrorKind::Other,
                "object path missing parent directory",
            ))
        })?;
        fs::create_dir_all(&parent).await?;

        // Copy next to the destination first so readers never see a partial object.
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        if let Err(err) = fs::copy(path, &tmp_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }

        debug!("stored {}/{} at {}", bucket, name, file_path.display());
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        storage_url(&self.public_host, bucket, name)
    }
}
