//! Shared test helpers for portfolio-site integration tests.

use std::path::Path;
use std::sync::Arc;

use crate::backend::{AuthProvider, ContentStore, LocalBackend};
use crate::config::{Config, StorageConfig};
use crate::object_store::{LocalStore, ObjectStore};
use crate::storage::Database;
use crate::AppState;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
pub const VISITOR_EMAIL: &str = "visitor@example.com";
pub const VISITOR_PASSWORD: &str = "just looking around";

/// Create a test AppState on the local backend rooted at `root`.
///
/// One admin and one non-admin account are seeded. The database handle is
/// returned so tests can seed rows directly.
pub fn test_state(root: &Path) -> (Arc<AppState>, Database) {
    let data_dir = root.join("data");
    let files_dir = root.join("files");

    let mut config = Config::default();
    config.backend.data_dir = data_dir.to_string_lossy().to_string();
    config.storage = StorageConfig {
        local_storage_path: files_dir.to_string_lossy().to_string(),
        ..StorageConfig::default()
    };
    config.max_upload_size = 1024 * 1024; // 1MB for tests

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let backend = LocalBackend::new(db.clone());
    backend
        .seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .expect("Failed to seed admin");
    db.upsert_user(VISITOR_EMAIL, VISITOR_PASSWORD)
        .expect("Failed to seed visitor");

    let backend = Arc::new(backend);
    let content: Arc<dyn ContentStore> = backend.clone();
    let auth: Arc<dyn AuthProvider> = backend;
    let object_store: Arc<dyn ObjectStore> =
        Arc::new(LocalStore::new(&files_dir).expect("Failed to create test object store"));

    let state = Arc::new(AppState {
        config,
        content,
        auth,
        object_store,
    });
    (state, db)
}
