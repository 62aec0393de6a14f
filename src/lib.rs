//! portfolio-site - A personal portfolio website over a hosted backend
//!
//! This crate serves the public pages and admin area with:
//! - Photo galleries (food, cars) and an anime log rendered server-side
//! - JSON like/view counter endpoints
//! - Session-cookie sign-in and an admin allowlist gate
//! - Swappable backends: hosted Postgres REST/auth/storage, or a local redb + filesystem stand-in

pub mod api;
pub mod backend;
pub mod config;
pub mod models;
pub mod object_store;
pub mod storage;
#[doc(hidden)]
pub mod testutil;

use std::sync::Arc;

use backend::{AuthProvider, ContentStore};
use config::Config;
use object_store::ObjectStore;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub content: Arc<dyn ContentStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub object_store: Arc<dyn ObjectStore>,
}

impl AppState {
    /// Displayable URL for a photo's stored `image_path`.
    pub fn media_url(&self, image_path: &str) -> String {
        object_store::media_public_url(self.config.public_media_base(), image_path)
    }
}
