//! Namespace store: the parent-pointer tree persisted in the `nodes` table.
//!
//! Reads go through pooled connections and only ever see committed state.
//! Every mutation runs inside one [`UnitOfWork`], so a directory rename or a
//! subtree delete is observed either completely or not at all.
//!
//! The connection-level helpers at the bottom of this file take a bare
//! `&mut SqliteConnection` so the ingestion coordinator can stage several
//! writes inside a single unit of work.

use sqlx::SqliteConnection;
use tracing::{debug, info};

use super::node::{Category, NewNode, Node, DIRECTORY_SIZE};
use super::path::{self, ROOT};
use crate::db::{Database, UnitOfWork};
use crate::{AnonfsError, Result};

const NODE_COLUMNS: &str =
    "id, name, full_path, category, size, parent, parent_id, url, created_at, updated_at";

/// Store for namespace nodes.
pub struct NamespaceStore<'a> {
    db: &'a Database,
}

impl<'a> NamespaceStore<'a> {
    /// Create a new NamespaceStore on the given database.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create the root directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<Node> {
        let mut uow = self.db.unit_of_work().await?;
        if let Some(root) = fetch_by_path(uow.conn(), ROOT).await? {
            return Ok(root);
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO nodes (name, full_path, category, size, parent, parent_id, url)
             VALUES (?, ?, ?, ?, '', NULL, '') RETURNING id",
        )
        .bind(ROOT)
        .bind(ROOT)
        .bind(Category::Directory.as_str())
        .bind(DIRECTORY_SIZE)
        .fetch_one(uow.conn())
        .await?;

        let root = fetch_by_id(uow.conn(), id)
            .await?
            .ok_or_else(|| AnonfsError::NotFound("root directory".to_string()))?;
        uow.commit().await?;

        info!("Created root directory");
        Ok(root)
    }

    /// Check whether `parent` already has a child called `name`.
    pub async fn exists(&self, parent: &str, name: &str) -> Result<bool> {
        let parent = path::normalize(parent)?;
        let mut conn = self.db.pool().acquire().await?;
        sibling_exists(&mut conn, &parent, name).await
    }

    /// Look up a node by full path, returning `None` when absent.
    pub async fn find(&self, full_path: &str) -> Result<Option<Node>> {
        let full_path = path::normalize(full_path)?;
        let mut conn = self.db.pool().acquire().await?;
        fetch_by_path(&mut conn, &full_path).await
    }

    /// Get a node by full path.
    pub async fn get(&self, full_path: &str) -> Result<Node> {
        self.find(full_path)
            .await?
            .ok_or_else(|| AnonfsError::NotFound(format!("node {full_path}")))
    }

    /// Get a node by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Node> {
        let mut conn = self.db.pool().acquire().await?;
        fetch_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| AnonfsError::NotFound(format!("node {id}")))
    }

    /// List the direct children of `parent`, ordered by name.
    ///
    /// An empty directory (or an unknown path) yields an empty list.
    pub async fn list_children(&self, parent: &str) -> Result<Vec<Node>> {
        let parent = path::normalize(parent)?;
        let nodes = sqlx::query_as::<_, Node>(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes WHERE parent = ? ORDER BY name"
        ))
        .bind(&parent)
        .fetch_all(self.db.pool())
        .await?;

        debug!(parent = %parent, count = nodes.len(), "Listed children");
        Ok(nodes)
    }

    /// Create a directory named `name` under `parent`.
    pub async fn create_directory(&self, parent: &str, name: &str) -> Result<Node> {
        let parent = path::normalize(parent)?;
        let mut uow = self.db.unit_of_work().await?;
        let node = insert_node(uow.conn(), &NewNode::directory(parent, name)).await?;
        uow.commit().await?;

        info!(path = %node.full_path, "Created directory");
        Ok(node)
    }

    /// Create a file entry named `name` under `parent`.
    pub async fn create_file(
        &self,
        parent: &str,
        name: &str,
        size: &str,
        url: &str,
    ) -> Result<Node> {
        let parent = path::normalize(parent)?;
        let mut uow = self.db.unit_of_work().await?;
        let node = insert_node(uow.conn(), &NewNode::file(parent, name, size, url)).await?;
        uow.commit().await?;

        info!(path = %node.full_path, "Created file");
        Ok(node)
    }

    /// Rename or move node `id` to `new_full_path`.
    ///
    /// For a directory every descendant's `parent` and `full_path` are rewritten
    /// by prefix substitution in the same unit of work. The destination parent
    /// must be an existing directory.
    pub async fn rename(&self, id: i64, new_full_path: &str) -> Result<Node> {
        let mut uow = self.db.unit_of_work().await?;
        let node = rename_in(&mut uow, id, new_full_path).await?;
        uow.commit().await?;
        Ok(node)
    }

    /// Delete the node at `full_path` and, for a directory, its whole subtree.
    ///
    /// Returns the number of removed nodes; a missing path removes nothing and
    /// is not an error.
    pub async fn delete_subtree(&self, full_path: &str) -> Result<u64> {
        let full_path = path::normalize(full_path)?;
        if full_path == ROOT {
            return Err(AnonfsError::Parameter(
                "the root directory cannot be deleted".to_string(),
            ));
        }

        let mut uow = self.db.unit_of_work().await?;
        let Some(node) = fetch_by_path(uow.conn(), &full_path).await? else {
            debug!(path = %full_path, "Delete of missing node ignored");
            return Ok(0);
        };

        let mut removed = 0u64;
        if node.is_dir() {
            let (low, high) = path::descendant_range(&node.full_path);
            let descendants: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM nodes WHERE full_path >= ? AND full_path < ?",
            )
            .bind(&low)
            .bind(&high)
            .fetch_one(uow.conn())
            .await?;

            sqlx::query("DELETE FROM nodes WHERE full_path >= ? AND full_path < ?")
                .bind(&low)
                .bind(&high)
                .execute(uow.conn())
                .await?;
            removed += descendants as u64;
        }

        sqlx::query("DELETE FROM nodes WHERE id = ?")
            .bind(node.id)
            .execute(uow.conn())
            .await?;
        removed += 1;

        uow.commit().await?;

        info!(path = %full_path, removed, "Deleted subtree");
        Ok(removed)
    }
}

async fn rename_in(uow: &mut UnitOfWork, id: i64, new_full_path: &str) -> Result<Node> {
    let new_path = path::normalize(new_full_path)?;
    if new_path == ROOT {
        return Err(AnonfsError::Parameter(
            "cannot rename a node to the root path".to_string(),
        ));
    }
    let (new_parent, new_name) = path::resolve(&new_path)?;

    let node = fetch_by_id(uow.conn(), id)
        .await?
        .ok_or_else(|| AnonfsError::NotFound(format!("node {id}")))?;

    if node.is_root() {
        return Err(AnonfsError::Parameter(
            "the root directory cannot be renamed".to_string(),
        ));
    }
    if node.full_path == new_path {
        return Ok(node);
    }
    if node.is_dir() && path::is_descendant(&new_path, &node.full_path) {
        return Err(AnonfsError::InvalidPath(format!(
            "cannot move {} into its own subtree",
            node.full_path
        )));
    }
    if fetch_by_path(uow.conn(), &new_path).await?.is_some() {
        return Err(AnonfsError::AlreadyExists(new_path));
    }
    let parent = require_directory(uow.conn(), &new_parent).await?;

    sqlx::query(
        "UPDATE nodes SET name = ?, full_path = ?, parent = ?, parent_id = ?,
                updated_at = datetime('now')
         WHERE id = ?",
    )
    .bind(&new_name)
    .bind(&new_path)
    .bind(&new_parent)
    .bind(parent.id)
    .bind(node.id)
    .execute(uow.conn())
    .await?;

    let mut rewritten = 0u64;
    if node.is_dir() {
        let old_path = &node.full_path;
        let (low, high) = path::descendant_range(old_path);
        // substr() counts characters, not bytes
        let tail_start = old_path.chars().count() as i64 + 1;

        let result = sqlx::query(
            "UPDATE nodes
             SET full_path = ? || substr(full_path, ?),
                 parent = ? || substr(parent, ?),
                 updated_at = datetime('now')
             WHERE full_path >= ? AND full_path < ?",
        )
        .bind(&new_path)
        .bind(tail_start)
        .bind(&new_path)
        .bind(tail_start)
        .bind(&low)
        .bind(&high)
        .execute(uow.conn())
        .await?;
        rewritten = result.rows_affected();

        verify_subtree(uow.conn(), &new_path).await?;
    }

    info!(
        from = %node.full_path,
        to = %new_path,
        descendants = rewritten,
        "Renamed node"
    );

    fetch_by_id(uow.conn(), id)
        .await?
        .ok_or_else(|| AnonfsError::NotFound(format!("node {id}")))
}

/// Check that every descendant of `root` agrees with the node its
/// `parent_id` points at.
async fn verify_subtree(conn: &mut SqliteConnection, root: &str) -> Result<()> {
    let (low, high) = path::descendant_range(root);
    let broken: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM nodes c
         LEFT JOIN nodes p ON p.id = c.parent_id
         WHERE c.full_path >= ? AND c.full_path < ?
           AND (p.id IS NULL
                OR c.parent != p.full_path
                OR c.full_path != CASE WHEN p.full_path = '/' THEN '/' || c.name
                                       ELSE p.full_path || '/' || c.name END)",
    )
    .bind(&low)
    .bind(&high)
    .fetch_one(conn)
    .await?;

    if broken > 0 {
        return Err(AnonfsError::Database(format!(
            "namespace integrity violation: {broken} inconsistent nodes under {root}"
        )));
    }
    Ok(())
}

/// Fetch a node by its full path.
pub(crate) async fn fetch_by_path(
    conn: &mut SqliteConnection,
    full_path: &str,
) -> Result<Option<Node>> {
    let node = sqlx::query_as::<_, Node>(&format!(
        "SELECT {NODE_COLUMNS} FROM nodes WHERE full_path = ?"
    ))
    .bind(full_path)
    .fetch_optional(conn)
    .await?;
    Ok(node)
}

/// Fetch a node by ID.
pub(crate) async fn fetch_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Node>> {
    let node = sqlx::query_as::<_, Node>(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(node)
}

/// Whether `parent` has a child named `name`.
pub(crate) async fn sibling_exists(
    conn: &mut SqliteConnection,
    parent: &str,
    name: &str,
) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM nodes WHERE parent = ? AND name = ?)")
            .bind(parent)
            .bind(name)
            .fetch_one(conn)
            .await?;
    Ok(exists)
}

/// Fetch `path` and require it to be a directory.
pub(crate) async fn require_directory(conn: &mut SqliteConnection, path: &str) -> Result<Node> {
    match fetch_by_path(conn, path).await? {
        Some(node) if node.is_dir() => Ok(node),
        _ => Err(AnonfsError::ParentNotFound(path.to_string())),
    }
}

/// Insert a node after checking its name, its parent and its siblings.
pub(crate) async fn insert_node(conn: &mut SqliteConnection, new_node: &NewNode) -> Result<Node> {
    path::validate_name(&new_node.name)?;
    let parent = require_directory(conn, &new_node.parent).await?;

    if sibling_exists(conn, &parent.full_path, &new_node.name).await? {
        return Err(AnonfsError::AlreadyExists(new_node.full_path()));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO nodes (name, full_path, category, size, parent, parent_id, url)
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&new_node.name)
    .bind(new_node.full_path())
    .bind(new_node.category.as_str())
    .bind(&new_node.size)
    .bind(&parent.full_path)
    .bind(parent.id)
    .bind(&new_node.url)
    .fetch_one(&mut *conn)
    .await?;

    fetch_by_id(conn, id)
        .await?
        .ok_or_else(|| AnonfsError::NotFound(format!("node {id}")))
}
