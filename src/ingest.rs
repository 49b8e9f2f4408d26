//! Ingestion: directory creation and atomic multi-file upload batches.
//!
//! A batch holds one [`UnitOfWork`](crate::db::UnitOfWork) for its whole
//! duration. Each file is uploaded to the remote provider and its node is
//! staged in that unit of work; nothing becomes visible until every file of
//! the batch has been accepted. Files the provider already stored before a
//! failure are not removed remotely.

use std::time::Duration;

use rand::Rng;
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use crate::config::UploadConfig;
use crate::db::Database;
use crate::namespace::store::{insert_node, require_directory, sibling_exists};
use crate::namespace::{path, NamespaceStore, NewNode, Node};
use crate::remote::{RemoteUploader, UploadedFile};
use crate::{AnonfsError, Result};

/// Letters used for disambiguation prefixes.
const PREFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of a disambiguation prefix.
const PREFIX_LEN: usize = 4;

/// Prefixes drawn before giving up on a colliding name.
const MAX_PREFIX_DRAWS: usize = 32;

/// Pause between upload attempts.
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// A file submitted for upload.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Requested leaf name.
    pub name: String,
    /// File bytes.
    pub content: Vec<u8>,
}

impl IncomingFile {
    /// Create a new incoming file.
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Coordinator for namespace writes that originate from clients.
pub struct IngestionCoordinator<'a> {
    db: &'a Database,
    uploader: &'a dyn RemoteUploader,
    config: &'a UploadConfig,
}

impl<'a> IngestionCoordinator<'a> {
    /// Create a new IngestionCoordinator.
    pub fn new(db: &'a Database, uploader: &'a dyn RemoteUploader, config: &'a UploadConfig) -> Self {
        Self {
            db,
            uploader,
            config,
        }
    }

    /// Create directory `name` under `parent`.
    pub async fn create_directory(&self, parent: &str, name: &str) -> Result<Node> {
        NamespaceStore::new(self.db).create_directory(parent, name).await
    }

    /// Upload `files` under `parent` as one batch.
    ///
    /// Files are processed in order. A name already taken under `parent` gets
    /// a random prefix instead of failing. The first file the provider refuses
    /// aborts the batch with that file's error and no node of the batch is
    /// kept. Returns the created nodes in submission order.
    ///
    /// The namespace writer lock is held for the whole batch, remote calls
    /// included. In the worst case every other mkdir, rename, delete and
    /// batch waits `files × upload.max_attempts × upload.timeout_secs`
    /// (plus the retry pauses) before it can start.
    pub async fn upload_batch(&self, parent: &str, files: Vec<IncomingFile>) -> Result<Vec<Node>> {
        let parent = path::normalize(parent)?;
        for file in &files {
            path::validate_name(&file.name)?;
        }

        let mut uow = self.db.unit_of_work().await?;
        require_directory(uow.conn(), &parent).await?;

        if files.is_empty() {
            debug!(parent = %parent, "Empty upload batch");
            return Ok(Vec::new());
        }

        let total = files.len();
        let mut created = Vec::with_capacity(total);
        for (index, file) in files.into_iter().enumerate() {
            let name = disambiguate(uow.conn(), &parent, &file.name).await?;
            if name != file.name {
                debug!(requested = %file.name, assigned = %name, "Disambiguated file name");
            }

            let uploaded = match self.upload_with_retry(&name, file.content).await {
                Ok(uploaded) => uploaded,
                Err(e) => {
                    warn!(
                        parent = %parent,
                        file = %name,
                        position = index + 1,
                        total,
                        "Upload batch aborted: {}",
                        e
                    );
                    return Err(e);
                }
            };

            let node = insert_node(
                uow.conn(),
                &NewNode::file(parent.as_str(), name, uploaded.size, uploaded.url),
            )
            .await?;
            created.push(node);
        }

        uow.commit().await?;

        info!(parent = %parent, files = created.len(), "Committed upload batch");
        Ok(created)
    }

    async fn upload_with_retry(&self, name: &str, content: Vec<u8>) -> Result<UploadedFile> {
        let token = self.config.token.as_deref();
        let attempts = self.config.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.uploader.upload(name, content.clone(), token).await {
                Err(AnonfsError::RemoteUnavailable(reason)) if attempt < attempts => {
                    warn!(
                        file = %name,
                        attempt,
                        attempts,
                        "Provider unavailable, retrying: {}",
                        reason
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Pick a free name for `name` under `parent`.
async fn disambiguate(conn: &mut SqliteConnection, parent: &str, name: &str) -> Result<String> {
    if !sibling_exists(conn, parent, name).await? {
        return Ok(name.to_string());
    }

    for _ in 0..MAX_PREFIX_DRAWS {
        let candidate = format!("{}_{}", random_prefix(), name);
        if !sibling_exists(conn, parent, &candidate).await? {
            return Ok(candidate);
        }
    }

    Err(AnonfsError::AlreadyExists(path::join(parent, name)))
}

fn random_prefix() -> String {
    let mut rng = rand::rng();
    (0..PREFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..PREFIX_CHARS.len());
            PREFIX_CHARS[idx] as char
        })
        .collect()
}
