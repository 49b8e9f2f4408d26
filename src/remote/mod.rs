//! Remote upload provider.
//!
//! The provider stores the file bytes and hands back a durable URL; the
//! namespace only keeps that URL and the provider's size label.

mod client;
mod envelope;

pub use client::UploadClient;
pub use envelope::{decode, Envelope};

use async_trait::async_trait;

use crate::Result;

/// A file accepted by the remote provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Full public URL of the stored file.
    pub url: String,
    /// Human-readable size reported by the provider (e.g. `6.7 KB`).
    pub size: String,
}

/// One outbound upload to the remote provider.
///
/// Implementations make exactly one attempt per call. Provider-side refusals
/// surface as `RemoteRejected` with the provider's code and message; transport
/// failures and unreadable answers surface as `RemoteUnavailable`.
#[async_trait]
pub trait RemoteUploader: Send + Sync {
    /// Upload `content` as `filename`, authenticating with `token` if given.
    async fn upload(
        &self,
        filename: &str,
        content: Vec<u8>,
        token: Option<&str>,
    ) -> Result<UploadedFile>;
}
