//! Response DTOs for the HTTP API.

use serde::Serialize;

use crate::namespace::{Category, Node};
use crate::query::Listing;

/// Uniform response envelope: `{status, message, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Domain status code.
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
    /// Payload, when the operation has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a response carrying `data`.
    pub fn new(status: impl Into<String>, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create a response without payload.
    pub fn message(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            data: None,
        }
    }
}

/// Node information in responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse {
    /// Node ID.
    pub id: i64,
    /// Leaf name.
    pub name: String,
    /// Full path.
    pub full_path: String,
    /// `directory` or `file`.
    pub category: Category,
    /// Size label.
    pub size: String,
    /// Full path of the parent directory.
    pub parent: String,
    /// Remote URL (empty for directories).
    pub url: String,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Last rename time (RFC 3339).
    pub updated_at: String,
}

impl From<Node> for NodeResponse {
    fn from(node: Node) -> Self {
        let created_at = node.created_at_datetime().to_rfc3339();
        let updated_at = node.updated_at_datetime().to_rfc3339();
        Self {
            id: node.id,
            name: node.name,
            full_path: node.full_path,
            category: node.category,
            size: node.size,
            parent: node.parent,
            url: node.url,
            created_at,
            updated_at,
        }
    }
}

/// Payload of `GET /api/file/info/*path`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    /// The file, or the directory's children ordered by name.
    pub nodes: Vec<NodeResponse>,
    /// True when the path named a file.
    pub is_leaf: bool,
}

impl From<Listing> for InfoResponse {
    fn from(listing: Listing) -> Self {
        Self {
            nodes: listing.nodes.into_iter().map(NodeResponse::from).collect(),
            is_leaf: listing.is_leaf,
        }
    }
}

/// Payload of `GET /api/file/exist/*path`.
#[derive(Debug, Serialize)]
pub struct ExistResponse {
    /// Whether the path exists.
    pub exists: bool,
    /// The node, when it exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeResponse>,
}

/// Payload of `DELETE /api/file/*path`.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Number of removed nodes.
    pub removed: u64,
}
