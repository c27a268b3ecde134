//! Around Service
//!
//! Geo-tagged post service: multipart ingestion of a message and image,
//! and radius search around a point with content moderation.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod media;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod moderation;
pub mod multipart;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
