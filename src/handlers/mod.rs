pub mod health_handlers;
pub mod picture_handlers;
