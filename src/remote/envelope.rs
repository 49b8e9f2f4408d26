//! Response envelopes of the remote provider.
//!
//! Two shapes exist and the `status` boolean says which one the body is:
//!
//! ```json
//! {"status": true,  "data":  {"file": {"url": {"full": "..."}, "metadata": {"size": {"readable": "..."}}}}}
//! {"status": false, "error": {"message": "...", "type": "...", "code": 10}}
//! ```

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::UploadedFile;
use crate::{AnonfsError, Result};

/// A decoded provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// The file was stored.
    Success(UploadedFile),
    /// The provider refused the file.
    Failure {
        code: String,
        message: String,
        kind: Option<String>,
    },
}

impl Envelope {
    /// Turn the envelope into the upload outcome.
    pub fn into_result(self) -> Result<UploadedFile> {
        match self {
            Envelope::Success(file) => Ok(file),
            Envelope::Failure { code, message, .. } => {
                Err(AnonfsError::RemoteRejected { code, message })
            }
        }
    }
}

#[derive(Deserialize)]
struct SuccessBody {
    data: SuccessData,
}

#[derive(Deserialize)]
struct SuccessData {
    file: RemoteFile,
}

#[derive(Deserialize)]
struct RemoteFile {
    url: RemoteUrl,
    metadata: RemoteMetadata,
}

#[derive(Deserialize)]
struct RemoteUrl {
    full: String,
}

#[derive(Deserialize)]
struct RemoteMetadata {
    size: RemoteSize,
}

#[derive(Deserialize)]
struct RemoteSize {
    readable: String,
}

#[derive(Deserialize)]
struct FailureBody {
    error: RemoteError,
}

#[derive(Deserialize)]
struct RemoteError {
    #[serde(default)]
    code: Value,
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Decode a provider response body.
///
/// A body that is not JSON, lacks a boolean `status`, or does not match the
/// shape its `status` announces is a `RemoteUnavailable` error.
pub fn decode(body: &[u8]) -> Result<Envelope> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AnonfsError::RemoteUnavailable(format!("malformed response: {e}")))?;

    match value.get("status").and_then(Value::as_bool) {
        Some(true) => {
            let body: SuccessBody = serde_json::from_value(value).map_err(|e| {
                AnonfsError::RemoteUnavailable(format!("malformed success envelope: {e}"))
            })?;
            Ok(Envelope::Success(UploadedFile {
                url: body.data.file.url.full,
                size: body.data.file.metadata.size.readable,
            }))
        }
        Some(false) => {
            let body: FailureBody = serde_json::from_value(value).map_err(|e| {
                AnonfsError::RemoteUnavailable(format!("malformed error envelope: {e}"))
            })?;
            let error = body.error;
            debug!(code = %error.code, kind = ?error.kind, "Provider returned error envelope");
            Ok(Envelope::Failure {
                code: code_to_string(&error.code),
                message: error.message,
                kind: error.kind,
            })
        }
        None => Err(AnonfsError::RemoteUnavailable(
            "response has no boolean status field".to_string(),
        )),
    }
}

fn code_to_string(code: &Value) -> String {
    match code {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
