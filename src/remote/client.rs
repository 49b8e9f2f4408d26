//! HTTP client for the remote upload provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, warn};

use super::envelope::{self, Envelope};
use super::{RemoteUploader, UploadedFile};
use crate::config::UploadConfig;
use crate::{AnonfsError, Result};

/// User agent sent with every upload.
const USER_AGENT: &str = concat!("anonfs/", env!("CARGO_PKG_VERSION"));

/// Uploads files to the provider with a multipart POST.
#[derive(Debug, Clone)]
pub struct UploadClient {
    client: Client,
    endpoint: String,
}

impl UploadClient {
    /// Create a client for the endpoint and timeouts in `config`.
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                AnonfsError::Config(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: config.url.clone(),
        })
    }

    /// Upload endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteUploader for UploadClient {
    async fn upload(
        &self,
        filename: &str,
        content: Vec<u8>,
        token: Option<&str>,
    ) -> Result<UploadedFile> {
        let length = content.len();
        let mut form = Form::new()
            .part("file", Part::bytes(content).file_name(filename.to_string()))
            .text("filename", filename.to_string());
        if let Some(token) = token {
            form = form.text("token", token.to_string());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(filename, "Upload request failed: {}", e);
                AnonfsError::RemoteUnavailable(format!("upload request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            AnonfsError::RemoteUnavailable(format!("failed to read response: {}", e))
        })?;
        debug!(filename, bytes = length, http_status = %status, "Provider answered");

        let decoded = envelope::decode(&body)?;
        if !status.is_success() && matches!(decoded, Envelope::Success(_)) {
            return Err(AnonfsError::RemoteUnavailable(format!(
                "provider returned HTTP {} with a success envelope",
                status
            )));
        }
        decoded.into_result()
    }
}
