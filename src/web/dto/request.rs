//! Request DTOs for the HTTP API.

use serde::Deserialize;

use crate::ingest::IncomingFile;
use crate::AnonfsError;

/// `flag` value that selects directory creation on `POST /api/file/new`.
pub const FLAG_DIRECTORY: &str = "directory";

/// Rename request (`PUT /api/file/update`, urlencoded).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequest {
    /// New full path of the node.
    #[serde(default, rename = "fileName")]
    pub file_name: String,
    /// Node ID, as sent by the client.
    #[serde(default)]
    pub id: String,
}

impl UpdateRequest {
    /// Parse the numeric node ID.
    pub fn node_id(&self) -> Result<i64, AnonfsError> {
        self.id
            .trim()
            .parse()
            .map_err(|_| AnonfsError::Parameter(format!("invalid id: {:?}", self.id)))
    }
}

/// Fields of a `POST /api/file/new` multipart body.
#[derive(Debug, Default)]
pub struct NewRequest {
    /// `directory` for mkdir, anything else for an upload batch.
    pub flag: String,
    /// Full path of the parent directory.
    pub parent: String,
    /// Name of the directory to create.
    pub dir_name: String,
    /// Uploaded files in submission order.
    pub files: Vec<IncomingFile>,
}

impl NewRequest {
    /// Whether the request asks for a directory.
    pub fn is_directory(&self) -> bool {
        self.flag == FLAG_DIRECTORY
    }

    /// The parent path. A missing or blank `parent` names no directory.
    pub fn parent(&self) -> Result<&str, AnonfsError> {
        if self.parent.trim().is_empty() {
            return Err(AnonfsError::ParentNotFound(
                "parent dir is not exist".to_string(),
            ));
        }
        Ok(&self.parent)
    }
}
