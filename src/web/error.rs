//! API error handling for the anonfs HTTP surface.
//!
//! Failures travel in the same `{status, message}` envelope as successes.
//! The transport status stays 200; the intended HTTP status rides along as a
//! [`StrictStatus`] response extension so the router can apply it when
//! `server.strict_http_status` is enabled.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ApiResponse;
use crate::AnonfsError;

/// Domain status of a successful operation.
pub const STATUS_OK: &str = "2002";

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed parameter or path.
    BadRequest,
    /// Parent directory missing.
    ParentNotFound,
    /// Node not found.
    NotFound,
    /// Name already taken.
    Conflict,
    /// Remote provider refused the upload.
    RemoteRejected,
    /// Remote provider unreachable.
    RemoteUnavailable,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    /// Get the domain status string for this error.
    pub fn domain_status(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest | ErrorCode::Conflict => "3004",
            ErrorCode::ParentNotFound => "3003",
            ErrorCode::NotFound => "3005",
            ErrorCode::RemoteRejected => "5001",
            ErrorCode::RemoteUnavailable => "5002",
            ErrorCode::InternalError => "5000",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::ParentNotFound | ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::RemoteRejected => StatusCode::BAD_GATEWAY,
            ErrorCode::RemoteUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// HTTP status an error response would carry in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictStatus(pub StatusCode);

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    status: String,
    message: String,
}

impl ApiError {
    /// Create a new API error with the code's own domain status.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: code.domain_status().to_string(),
            message: message.into(),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Domain status reported in the envelope.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Message reported in the envelope.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: ApiResponse<()> = ApiResponse::message(self.status, self.message);
        let mut response = Json(body).into_response();
        response
            .extensions_mut()
            .insert(StrictStatus(self.code.status_code()));
        response
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?}): {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<AnonfsError> for ApiError {
    fn from(err: AnonfsError) -> Self {
        match err {
            AnonfsError::InvalidPath(_) | AnonfsError::Parameter(_) => {
                ApiError::bad_request(err.to_string())
            }
            AnonfsError::ParentNotFound(_) => {
                ApiError::new(ErrorCode::ParentNotFound, err.to_string())
            }
            AnonfsError::AlreadyExists(_) => ApiError::new(ErrorCode::Conflict, err.to_string()),
            AnonfsError::NotFound(_) => ApiError::not_found(err.to_string()),
            AnonfsError::RemoteRejected { code, message } => Self {
                code: ErrorCode::RemoteRejected,
                status: code,
                message,
            },
            AnonfsError::RemoteUnavailable(_) => {
                tracing::warn!("Remote provider unavailable: {}", err);
                ApiError::new(ErrorCode::RemoteUnavailable, err.to_string())
            }
            AnonfsError::Database(_) | AnonfsError::Io(_) | AnonfsError::Config(_) => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

/// Apply the [`StrictStatus`] extension of a response to its status line.
pub async fn apply_strict_status(mut response: Response) -> Response {
    if let Some(StrictStatus(status)) = response.extensions().get::<StrictStatus>().copied() {
        *response.status_mut() = status;
    }
    response
}
