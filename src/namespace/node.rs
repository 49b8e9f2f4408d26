//! Node types for the namespace.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use super::path::{self, ROOT};

/// Size label carried by every directory.
pub const DIRECTORY_SIZE: &str = "4KB";

/// Kind of namespace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A directory; may have children.
    Directory,
    /// A file whose bytes live at the remote provider.
    File,
}

impl Category {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Directory => "directory",
            Category::File => "file",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "directory" => Ok(Category::Directory),
            "file" => Ok(Category::File),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One entry of the namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique node ID.
    pub id: i64,
    /// Leaf name, unique within the parent.
    pub name: String,
    /// Fully-qualified path from the root.
    pub full_path: String,
    /// Directory or file.
    #[sqlx(try_from = "String")]
    pub category: Category,
    /// Human-readable size label.
    pub size: String,
    /// Full path of the containing directory ('' for the root).
    pub parent: String,
    /// ID of the containing directory (None for the root).
    #[serde(skip)]
    pub parent_id: Option<i64>,
    /// Remote URL; empty for directories.
    pub url: String,
    /// When the node was created (SQLite `datetime('now')` format).
    pub created_at: String,
    /// When the node was last renamed or moved.
    pub updated_at: String,
}

impl Node {
    /// Whether this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.category == Category::Directory
    }

    /// Whether this is the root directory.
    pub fn is_root(&self) -> bool {
        self.full_path == ROOT
    }

    /// Get created_at as `DateTime<Utc>`.
    pub fn created_at_datetime(&self) -> DateTime<Utc> {
        parse_sqlite_datetime(&self.created_at)
    }

    /// Get updated_at as `DateTime<Utc>`.
    pub fn updated_at_datetime(&self) -> DateTime<Utc> {
        parse_sqlite_datetime(&self.updated_at)
    }
}

fn parse_sqlite_datetime(value: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Data for inserting a node.
#[derive(Debug, Clone)]
pub struct NewNode {
    /// Leaf name.
    pub name: String,
    /// Full path of the containing directory.
    pub parent: String,
    /// Directory or file.
    pub category: Category,
    /// Human-readable size label.
    pub size: String,
    /// Remote URL (files only).
    pub url: String,
}

impl NewNode {
    /// A directory named `name` under `parent`.
    pub fn directory(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            category: Category::Directory,
            size: DIRECTORY_SIZE.to_string(),
            url: String::new(),
        }
    }

    /// A file named `name` under `parent`, stored remotely at `url`.
    pub fn file(
        parent: impl Into<String>,
        name: impl Into<String>,
        size: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            category: Category::File,
            size: size.into(),
            url: url.into(),
        }
    }

    /// Full path the node will occupy.
    pub fn full_path(&self) -> String {
        path::join(&self.parent, &self.name)
    }
}
