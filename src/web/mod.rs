//! HTTP API for the anonfs namespace.
//!
//! Every response, failures included, uses the `{status, message, data?}`
//! envelope with a string domain status.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
