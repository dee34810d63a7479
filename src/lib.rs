//! Picture frontend: uploads pictures to a bucket, lists their metadata and
//! redirects to the stored pictures, thumbnails and collage.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod time_ago;
