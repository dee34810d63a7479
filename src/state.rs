//! Shared application state handed to every handler.

use crate::services::{MetadataStore, ObjectStore};
use std::{path::PathBuf, sync::Arc};

/// Name of the collage object in the thumbnails bucket.
pub const COLLAGE_OBJECT: &str = "collage.png";

/// The two buckets this frontend talks to.
#[derive(Clone, Debug)]
pub struct Buckets {
    pub pictures: String,
    pub thumbnails: String,
}

#[derive(Clone)]
pub struct AppState {
    pub objects: Arc<dyn ObjectStore>,
    pub pictures: Arc<dyn MetadataStore>,
    pub buckets: Buckets,

    /// Where uploads are written before being transferred to the pictures bucket.
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        pictures: Arc<dyn MetadataStore>,
        buckets: Buckets,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            objects,
            pictures,
            buckets,
            upload_dir: upload_dir.into(),
        }
    }
}
