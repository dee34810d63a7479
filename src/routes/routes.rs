//! Defines the routes of the picture frontend.
//!
//! ## Structure
//! - **Picture endpoints**
//!   - `POST /api/pictures` — upload the multipart `picture` file
//!   - `GET  /api/pictures` — list picture metadata, newest first
//!   - `GET  /api/pictures/{name}` — redirect to the picture in storage
//!
//! - **Derived artifacts**
//!   - `GET  /api/thumbnails/{name}` — redirect to the thumbnail in storage
//!   - `GET  /api/collage` — redirect to the collage in storage
//!
//! Everything else is served from the static asset directory.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        picture_handlers::{
            list_pictures, redirect_to_collage, redirect_to_picture, redirect_to_thumbnail,
            upload_picture,
        },
    },
    state::AppState,
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use std::path::Path;
use tower_http::services::ServeDir;

/// Build and return the router for the API plus the static fallback.
///
/// Request bodies larger than `max_upload_bytes` are rejected with 413.
pub fn routes(static_dir: impl AsRef<Path>, max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/api/pictures", get(list_pictures).post(upload_picture))
        .route("/api/pictures/{name}", get(redirect_to_picture))
        .route("/api/thumbnails/{name}", get(redirect_to_thumbnail))
        .route("/api/collage", get(redirect_to_collage))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
}
