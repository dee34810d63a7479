//! HTTP handlers for picture upload, listing and the storage redirects.
//!
//! Uploads are streamed to a temporary file and then handed to the object
//! store; nothing here writes metadata, the ingestion pipeline does that.

use crate::{
    errors::AppError,
    models::picture::PictureSummary,
    state::{AppState, COLLAGE_OBJECT},
};
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::path::{Path as FsPath, PathBuf};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::info;

/// Multipart field carrying the uploaded picture.
pub const PICTURE_FIELD: &str = "picture";

/// An upload copied to the temporary directory.
#[derive(Debug)]
struct TempUpload {
    name: String,
    path: PathBuf,
    content_type: Option<String>,
    size_bytes: u64,
}

/// `POST /api/pictures` — store the `picture` file in the pictures bucket.
///
/// Requests that are not multipart, or that carry no `picture` file, get a
/// 400 before any storage write.
pub async fn upload_picture(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let Ok(mut multipart) = multipart else {
        info!("No file uploaded");
        return Err(AppError::no_file_uploaded());
    };

    let Some(upload) = save_picture_field(&state.upload_dir, &mut multipart).await? else {
        info!("No file uploaded");
        return Err(AppError::no_file_uploaded());
    };
    info!(
        name = %upload.name,
        size_bytes = upload.size_bytes,
        "File moved in temporary directory {}",
        upload.path.display()
    );

    state
        .objects
        .upload_file(
            &state.buckets.pictures,
            &upload.name,
            &upload.path,
            upload.content_type.as_deref(),
        )
        .await?;
    info!(
        "Uploaded new picture {} into bucket {}",
        upload.name, state.buckets.pictures
    );

    Ok(found("/"))
}

/// `GET /api/pictures` — every picture record, newest first.
pub async fn list_pictures(
    State(state): State<AppState>,
) -> Result<Json<Vec<PictureSummary>>, AppError> {
    info!("Retrieving list of pictures");

    let records = state.pictures.list_newest_first().await?;
    if records.is_empty() {
        info!("No pictures found");
    }

    let now = Utc::now();
    let summaries = records
        .into_iter()
        .map(|record| PictureSummary::from_record(record, now))
        .collect::<Vec<_>>();
    info!(count = summaries.len(), "Listed pictures");

    Ok(Json(summaries))
}

/// `GET /api/pictures/{name}` — redirect to the picture's public URL.
pub async fn redirect_to_picture(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    found(&state.objects.public_url(&state.buckets.pictures, &name))
}

/// `GET /api/thumbnails/{name}` — redirect to the thumbnail's public URL.
pub async fn redirect_to_thumbnail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    found(&state.objects.public_url(&state.buckets.thumbnails, &name))
}

/// `GET /api/collage` — redirect to the collage in the thumbnails bucket.
pub async fn redirect_to_collage(State(state): State<AppState>) -> Response {
    found(&state.objects.public_url(&state.buckets.thumbnails, COLLAGE_OBJECT))
}

/// Copy the first `picture` file of the request to `dir` under its base name.
///
/// Returns `None` when the request has no such field, or when the field has
/// no usable file name.
async fn save_picture_field(
    dir: &FsPath,
    multipart: &mut Multipart,
) -> Result<Option<TempUpload>, AppError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(PICTURE_FIELD) {
            continue;
        }
        let Some(name) = field.file_name().and_then(base_name) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        info!(name = %name, content_type = ?content_type, "Receiving file");

        // Same-named uploads share this path; the last one to finish wins.
        let path = dir.join(&name);
        let mut file = File::create(&path).await?;
        let mut size_bytes: u64 = 0;
        while let Some(chunk) = field.chunk().await? {
            size_bytes += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        return Ok(Some(TempUpload {
            name,
            path,
            content_type,
            size_bytes,
        }));
    }

    Ok(None)
}

/// Final path component of a client-supplied file name.
fn base_name(raw: &str) -> Option<String> {
    FsPath::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// `302 Found` to `location`.
///
/// The location is passed through unescaped; only control bytes, which no
/// header may carry, are percent-encoded.
fn found(location: &str) -> Response {
    let value = HeaderValue::from_bytes(location.as_bytes()).unwrap_or_else(|_| {
        let mut escaped = String::with_capacity(location.len());
        for c in location.chars() {
            if c.is_ascii_control() {
                escaped.push_str(&format!("%{:02X}", c as u8));
            } else {
                escaped.push(c);
            }
        }
        HeaderValue::from_bytes(escaped.as_bytes()).unwrap_or_else(|_| HeaderValue::from_static("/"))
    });

    (StatusCode::FOUND, [(header::LOCATION, value)]).into_response()
}
