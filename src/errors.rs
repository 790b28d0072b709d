use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

use crate::models::SubmissionResult;

/// Application-specific error types.
///
/// Every variant renders as the uniform `{success: false, message}` body.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// The submission endpoint only accepts POST (and OPTIONS preflights).
    MethodNotAllowed,
    /// Required form fields were absent or blank (form key names).
    MissingFields(Vec<&'static str>),
    /// Shopify answered but declined to create the customer.
    UpstreamRejected(String),
    /// The request body could not be read (too large, aborted mid-stream).
    UnreadableBody { status: StatusCode, reason: String },
    /// Anything else: unparseable request, transport fault, malformed upstream response.
    ServerError(String),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MissingFields(_) | AppError::UpstreamRejected(_) => StatusCode::BAD_REQUEST,
            AppError::UnreadableBody { status, .. } => *status,
            AppError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error as the message returned to the caller.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MethodNotAllowed => write!(f, "Method not allowed"),
            AppError::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            AppError::UpstreamRejected(msg) => write!(f, "{}", msg),
            AppError::UnreadableBody { reason, .. } => {
                write!(f, "Request body rejected: {}", reason)
            }
            AppError::ServerError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Logs according to severity; upstream detail has already been logged by the client.
    fn into_response(self) -> Response {
        match &self {
            AppError::MethodNotAllowed => tracing::debug!("Rejected method on submission endpoint"),
            AppError::MissingFields(fields) => {
                tracing::warn!("⚠️  Submission missing required fields: {:?}", fields)
            }
            AppError::UpstreamRejected(msg) => {
                tracing::warn!("❌ Shopify rejected customer creation: {}", msg)
            }
            AppError::UnreadableBody { status, reason } => {
                tracing::warn!("⚠️  Unreadable submission body ({}): {}", status, reason)
            }
            AppError::ServerError(msg) => tracing::error!("Server error: {}", msg),
        }

        let body = Json(SubmissionResult::failure(self.to_string()));
        (self.status(), body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    /// Converts a `serde_json::Error` into an `AppError`.
    fn from(err: serde_json::Error) -> Self {
        AppError::ServerError(err.to_string())
    }
}
