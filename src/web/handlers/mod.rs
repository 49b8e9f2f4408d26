//! API handlers for the anonfs HTTP surface.

pub mod file;

pub use file::*;

use std::sync::Arc;

use crate::config::UploadConfig;
use crate::db::Database;
use crate::remote::RemoteUploader;

/// Shared database handle.
pub type SharedDatabase = Arc<Database>;

/// Application state shared by all handlers.
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// Remote upload provider.
    pub uploader: Arc<dyn RemoteUploader>,
    /// Upload settings (token, retry policy).
    pub upload: UploadConfig,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: SharedDatabase, uploader: Arc<dyn RemoteUploader>, upload: UploadConfig) -> Self {
        Self {
            db,
            uploader,
            upload,
        }
    }
}
