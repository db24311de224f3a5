//! Typed error handling for the supply order service
//!
//! Every failure the service can report is one of the variants of
//! [`SupplyError`]. Each category knows its HTTP status code and the
//! machine-readable code clients see in the `errorCode` field.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: the submitted form broke one or more rules (400)
//! - [`DeliveryError`]: the mail transport refused or failed the send (500)
//! - [`StorageError`]: the order store could not satisfy a request
//! - [`RequestError`]: a well-formed request that cannot be served (409, 400)
//! - [`ConfigError`]: invalid or missing configuration
//! - `Unexpected`: anything else, reported generically in production
//!
//! # Example
//!
//! ```rust,ignore
//! match handler.handle(&payload).await {
//!     Err(SupplyError::Request(RequestError::Duplicate { request_id })) => {
//!         println!("{} is still being processed", request_id);
//!     }
//!     Err(e) => eprintln!("{} ({})", e, e.error_code()),
//!     Ok(outcome) => println!("{:?}", outcome.state()),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the service
#[derive(Debug, Error)]
pub enum SupplyError {
    /// The submission failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The mail transport failed
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The order store failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The request cannot be served as sent
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Configuration problems
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Anything that should not happen in normal operation
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl SupplyError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SupplyError::Validation(_) => StatusCode::BAD_REQUEST,
            SupplyError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SupplyError::Storage(e) => e.status_code(),
            SupplyError::Request(e) => e.status_code(),
            SupplyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SupplyError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SupplyError::Validation(_) => "VALIDATION_ERROR",
            SupplyError::Delivery(e) => e.code.as_str(),
            SupplyError::Storage(e) => e.error_code(),
            SupplyError::Request(e) => e.error_code(),
            SupplyError::Config(_) => "CONFIG_ERROR",
            SupplyError::Unexpected(_) => "INTERNAL_ERROR",
        }
    }

    /// The user-facing summary placed in the `message` field
    pub fn public_message(&self) -> String {
        match self {
            SupplyError::Validation(_) => "Validation failed".to_string(),
            SupplyError::Delivery(e) => match e.code {
                DeliveryErrorCode::Auth
                | DeliveryErrorCode::Connection
                | DeliveryErrorCode::Timeout
                | DeliveryErrorCode::Transient => {
                    "Email service is temporarily unavailable. Please try again later.".to_string()
                }
                DeliveryErrorCode::Envelope => {
                    "Invalid email configuration. Please contact support.".to_string()
                }
                DeliveryErrorCode::Message => "Failed to submit order. Please try again.".to_string(),
            },
            SupplyError::Storage(StorageError::NotFound { .. }) => self.to_string(),
            SupplyError::Storage(_) => "Order storage is temporarily unavailable.".to_string(),
            SupplyError::Request(e) => e.to_string(),
            SupplyError::Config(_) => "The server is misconfigured. Please contact support.".to_string(),
            SupplyError::Unexpected(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    /// Detail placed in the `error` field
    ///
    /// With `expose_detail` off only information that is safe to show an end
    /// user is returned.
    fn detail(&self, expose_detail: bool) -> Option<String> {
        match self {
            SupplyError::Validation(_) => None,
            SupplyError::Delivery(e) => Some(if expose_detail {
                e.message.clone()
            } else {
                e.code.describe().to_string()
            }),
            SupplyError::Storage(StorageError::NotFound { .. }) | SupplyError::Request(_) => {
                Some(self.to_string())
            }
            SupplyError::Storage(_) | SupplyError::Config(_) | SupplyError::Unexpected(_) => {
                expose_detail.then(|| self.to_string())
            }
        }
    }

    /// Convert to an error response
    pub fn to_response(&self, expose_detail: bool) -> ErrorResponse {
        let errors = match self {
            SupplyError::Validation(e) => Some(e.errors.clone()),
            _ => None,
        };

        ErrorResponse {
            success: false,
            message: self.public_message(),
            errors,
            error: self.detail(expose_detail),
            error_code: self.error_code().to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Every violated validation rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error code for programmatic handling
    pub error_code: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Replace the summary message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// A [`SupplyError`] paired with the detail policy of the environment that
/// produced it
#[derive(Debug)]
pub struct ApiError {
    error: SupplyError,
    expose_detail: bool,
}

impl ApiError {
    pub fn new(error: impl Into<SupplyError>, expose_detail: bool) -> Self {
        Self {
            error: error.into(),
            expose_detail,
        }
    }

    pub fn error(&self) -> &SupplyError {
        &self.error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = Json(self.error.to_response(self.expose_detail));
        (status, body).into_response()
    }
}

impl IntoResponse for SupplyError {
    fn into_response(self) -> Response {
        ApiError::new(self, false).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Every rule a submission violated, in rule order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

impl ValidationError {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    /// The request body was not valid JSON
    pub fn invalid_json(detail: impl fmt::Display) -> Self {
        Self::single(format!("Request body must be valid JSON: {}", detail))
    }
}

// =============================================================================
// Delivery Errors
// =============================================================================

/// Classification of a mail transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeliveryErrorCode {
    /// The server rejected the credentials
    #[serde(rename = "EAUTH")]
    Auth,
    /// The server could not be reached or the TLS handshake failed
    #[serde(rename = "ECONNECTION")]
    Connection,
    /// A sender or recipient address was malformed or refused
    #[serde(rename = "EENVELOPE")]
    Envelope,
    /// The configured send timeout elapsed
    #[serde(rename = "ETIMEDOUT")]
    Timeout,
    /// The server answered with a temporary failure
    #[serde(rename = "ETRANSIENT")]
    Transient,
    /// The message itself could not be built
    #[serde(rename = "EMESSAGE")]
    Message,
}

impl DeliveryErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryErrorCode::Auth => "EAUTH",
            DeliveryErrorCode::Connection => "ECONNECTION",
            DeliveryErrorCode::Envelope => "EENVELOPE",
            DeliveryErrorCode::Timeout => "ETIMEDOUT",
            DeliveryErrorCode::Transient => "ETRANSIENT",
            DeliveryErrorCode::Message => "EMESSAGE",
        }
    }

    /// Short description that reveals nothing about the transport setup
    pub fn describe(&self) -> &'static str {
        match self {
            DeliveryErrorCode::Auth => "mail server authentication failed",
            DeliveryErrorCode::Connection => "mail server could not be reached",
            DeliveryErrorCode::Envelope => "mail envelope was rejected",
            DeliveryErrorCode::Timeout => "mail server timed out",
            DeliveryErrorCode::Transient => "mail server is temporarily unavailable",
            DeliveryErrorCode::Message => "mail message could not be built",
        }
    }
}

impl fmt::Display for DeliveryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed send or connectivity check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct DeliveryError {
    pub code: DeliveryErrorCode,
    pub message: String,
}

impl DeliveryError {
    pub fn new(code: DeliveryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to the order store
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// No order with this id
    #[error("Order with id '{id}' not found")]
    NotFound { id: Uuid },

    /// The backend failed
    #[error("Order store '{backend}' failed: {message}")]
    Backend { backend: String, message: String },
}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
            StorageError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::NotFound { .. } => "ORDER_NOT_FOUND",
            StorageError::Backend { .. } => "STORAGE_ERROR",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Requests that are well-formed but cannot be served
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// A submission with this request id is still being processed
    #[error("Submission '{request_id}' is already being processed")]
    Duplicate { request_id: String },

    /// Bad request
    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Duplicate { .. } => StatusCode::CONFLICT,
            RequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Duplicate { .. } => "DUPLICATE_SUBMISSION",
            RequestError::BadRequest { .. } => "BAD_REQUEST",
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors related to configuration loading and validation
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A required setting is empty
    #[error("Missing required setting: {key}")]
    Missing { key: String },

    /// A setting could not be parsed or is out of range
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    /// The configuration file could not be read or parsed
    #[error("Failed to load configuration{}: {message}", .file.as_ref().map(|f| format!(" from {}", f)).unwrap_or_default())]
    Load {
        file: Option<String>,
        message: String,
    },
}
