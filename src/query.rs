//! Read-only namespace queries.

use serde::Serialize;

use crate::db::Database;
use crate::namespace::{path, NamespaceStore, Node};
use crate::{AnonfsError, Result};

/// Result of an info query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// The file itself, or the children of the directory ordered by name.
    pub nodes: Vec<Node>,
    /// True when the path named a file.
    pub is_leaf: bool,
}

/// Query service for directory listings and existence checks.
pub struct QueryService<'a> {
    db: &'a Database,
}

impl<'a> QueryService<'a> {
    /// Create a new QueryService.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Describe `full_path`: a file yields itself, a directory its children.
    pub async fn info(&self, full_path: &str) -> Result<Listing> {
        let full_path = path::normalize(full_path)?;
        let store = NamespaceStore::new(self.db);
        let node = store
            .find(&full_path)
            .await?
            .ok_or_else(|| AnonfsError::NotFound(full_path.clone()))?;

        if node.is_dir() {
            Ok(Listing {
                nodes: store.list_children(&node.full_path).await?,
                is_leaf: false,
            })
        } else {
            Ok(Listing {
                nodes: vec![node],
                is_leaf: true,
            })
        }
    }

    /// The node at `full_path`, if any.
    pub async fn exists_at(&self, full_path: &str) -> Result<Option<Node>> {
        NamespaceStore::new(self.db).find(full_path).await
    }
}
