//! Axum extractor for raw JSON payloads
//!
//! Axum's own `Json` rejection answers with plain text. [`JsonPayload`]
//! reports a malformed body in the same shape as a failed validation so the
//! form can display it like any other error.

use crate::core::error::{SupplyError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// The request body as an untyped JSON value
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn submit_order(
///     State(host): State<Arc<ServerHost>>,
///     JsonPayload(payload): JsonPayload,
/// ) -> Response {
///     // payload parsed, not yet validated
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonPayload(pub Value);

impl JsonPayload {
    /// Get the inner payload
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl std::ops::Deref for JsonPayload {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(payload)) => Ok(JsonPayload(payload)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected malformed request body");
                Err(SupplyError::from(ValidationError::invalid_json(rejection.body_text()))
                    .into_response())
            }
        }
    }
}
