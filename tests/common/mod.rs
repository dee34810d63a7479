// Not every helper is used in every test file.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use picture_frontend::{
    models::picture::PictureRecord,
    routes::routes::routes,
    services::{MetadataStore, ObjectStore, StoreError, StoreResult, storage_url},
    state::{AppState, Buckets},
};
use std::{
    path::Path,
    sync::{Arc, Mutex},
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PICTURES_BUCKET: &str = "uploaded-pictures";
pub const THUMBNAILS_BUCKET: &str = "thumbnails";
pub const STORAGE_HOST: &str = "cloud.google.com";
pub const BOUNDARY: &str = "XxPictureBoundaryxX";

/// An object written through the fake store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bucket: String,
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Records uploads in memory instead of talking to a bucket.
#[derive(Default)]
pub struct FakeObjectStore {
    pub uploads: Mutex<Vec<StoredObject>>,
    pub fail: bool,
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn upload_file(
        &self,
        bucket: &str,
        name: &str,
        path: &Path,
        content_type: Option<&str>,
    ) -> StoreResult<()> {
        if self.fail {
            return Err(StoreError::Upstream("bucket unavailable".into()));
        }
        let bytes = tokio::fs::read(path).await?;
        self.uploads.lock().unwrap().push(StoredObject {
            bucket: bucket.to_string(),
            name: name.to_string(),
            bytes,
            content_type: content_type.map(str::to_string),
        });
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        storage_url(STORAGE_HOST, bucket, name)
    }
}

/// Serves a fixed list of records, already in the order the store returns them.
#[derive(Default)]
pub struct FakeMetadataStore {
    pub records: Vec<PictureRecord>,
    pub fail: bool,
}

#[async_trait]
impl MetadataStore for FakeMetadataStore {
    async fn list_newest_first(&self) -> StoreResult<Vec<PictureRecord>> {
        if self.fail {
            return Err(StoreError::Upstream("collection unavailable".into()));
        }
        Ok(self.records.clone())
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.fail {
            return Err(StoreError::Upstream("collection unavailable".into()));
        }
        Ok(())
    }
}

pub struct TestContext {
    pub router: Router,
    /// Set when the router runs on the in-memory fake object store.
    pub objects: Option<Arc<FakeObjectStore>>,
    pub upload_dir: TempDir,
    pub static_dir: TempDir,
}

impl TestContext {
    pub fn new(objects: FakeObjectStore, pictures: FakeMetadataStore) -> Self {
        Self::with_limit(objects, pictures, 10 * 1024 * 1024)
    }

    pub fn with_limit(
        objects: FakeObjectStore,
        pictures: FakeMetadataStore,
        max_upload_bytes: usize,
    ) -> Self {
        let objects = Arc::new(objects);
        let mut ctx = Self::with_stores(objects.clone(), Arc::new(pictures), max_upload_bytes);
        ctx.objects = Some(objects);
        ctx
    }

    /// Router over arbitrary store implementations, e.g. on-disk or SQLite.
    pub fn with_stores(
        objects: Arc<dyn ObjectStore>,
        pictures: Arc<dyn MetadataStore>,
        max_upload_bytes: usize,
    ) -> Self {
        let upload_dir = TempDir::new().expect("upload dir");
        let static_dir = TempDir::new().expect("static dir");
        std::fs::write(
            static_dir.path().join("index.html"),
            "<html><body>pictures</body></html>",
        )
        .expect("write index.html");

        let state = AppState::new(
            objects,
            pictures,
            Buckets {
                pictures: PICTURES_BUCKET.into(),
                thumbnails: THUMBNAILS_BUCKET.into(),
            },
            upload_dir.path(),
        );
        let router = routes(static_dir.path(), max_upload_bytes).with_state(state);

        Self {
            router,
            objects: None,
            upload_dir,
            static_dir,
        }
    }

    pub fn uploads(&self) -> Vec<StoredObject> {
        self.objects
            .as_ref()
            .map(|objects| objects.uploads.lock().unwrap().clone())
            .unwrap_or_default()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_multipart(&self, body: Vec<u8>) -> Response<Body> {
        self.send(
            Request::post("/api/pictures")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

/// One part of a multipart body.
pub enum Part<'a> {
    File {
        field: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
    Text {
        field: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                field,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        field, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { field, value } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                        field, value
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("utf-8 body")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}
