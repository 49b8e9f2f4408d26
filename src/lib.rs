//! anonfs - a virtual hierarchical file namespace over a remote upload provider.
//!
//! File bytes live at an anonymous upload service; this crate keeps the
//! directory tree (names, paths, remote URLs) in SQLite and serves it over an
//! HTTP API. Multi-file uploads are committed atomically.

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod namespace;
pub mod query;
pub mod remote;
pub mod web;

pub use config::Config;
pub use db::{Database, UnitOfWork};
pub use error::{AnonfsError, Result};
pub use ingest::{IncomingFile, IngestionCoordinator};
pub use namespace::{Category, NamespaceStore, NewNode, Node};
pub use query::{Listing, QueryService};
pub use remote::{RemoteUploader, UploadClient, UploadedFile};
pub use web::{AppState, WebServer};
