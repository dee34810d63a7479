//! Core data models for the picture frontend.
//!
//! Records map to the `pictures` table via `sqlx::FromRow` and summaries
//! serialize as JSON via `serde`.

pub mod picture;
