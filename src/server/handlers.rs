//! HTTP handlers for the order form
//!
//! Handlers translate between HTTP and the submission pipeline. They hold no
//! logic of their own beyond shaping responses.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::host::ServerHost;
use crate::core::validation::JsonPayload;
use crate::core::{ApiError, OrderRecord, OrderStatus, RequestError, StorageError};
use crate::submission::SubmissionOutcome;

/// Default page size of the order history listing
pub const DEFAULT_LIST_LIMIT: usize = 50;

const DEFAULT_UPDATED_BY: &str = "system";

/// Response for an accepted submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderResponse {
    pub success: bool,
    pub message: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    pub persisted: bool,
    pub duplicate: bool,
    pub timestamp: DateTime<Utc>,
}

/// Response for a successful diagnostic send
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEmailResponse {
    pub success: bool,
    pub message: String,
    pub message_id: String,
    pub recipients: String,
    pub timestamp: DateTime<Utc>,
}

/// Liveness report
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started
    pub uptime: f64,
    pub environment: String,
}

/// Response for the order history listing
#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderRecord>,
    pub count: usize,
    pub store: String,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub store: Option<String>,
    pub limit: Option<usize>,
}

/// Run a submission through the pipeline
pub async fn submit_order(
    State(host): State<Arc<ServerHost>>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<SubmitOrderResponse>, ApiError> {
    let expose = host.exposes_error_detail();

    match host.handler.handle(&payload).await {
        Ok(SubmissionOutcome::Acknowledged(ack)) => Ok(Json(SubmitOrderResponse {
            success: true,
            message: "Order submitted successfully! Email has been sent.".to_string(),
            message_id: ack.message_id,
            order_id: ack.order_id,
            persisted: ack.persisted,
            duplicate: ack.duplicate,
            timestamp: ack.timestamp,
        })),
        Ok(SubmissionOutcome::Rejected(rejection)) => Err(ApiError::new(rejection, expose)),
        Ok(SubmissionOutcome::SendFailed(failure)) => Err(ApiError::new(failure, expose)),
        Err(e) => Err(ApiError::new(e, expose)),
    }
}

/// Send the diagnostic email
///
/// Failures always carry the raw transport detail: this endpoint exists to
/// debug mail configuration.
pub async fn test_email(State(host): State<Arc<ServerHost>>) -> Response {
    match host.handler.handle_diagnostic().await {
        Ok(sent) => Json(TestEmailResponse {
            success: true,
            message: "Test email sent successfully!".to_string(),
            message_id: sent.message_id,
            recipients: host.handler.recipient().to_string(),
            timestamp: sent.timestamp,
        })
        .into_response(),
        Err(e) => {
            let body = e.to_response(true).with_message("Test email failed");
            (e.status_code(), Json(body)).into_response()
        }
    }
}

/// Liveness check
pub async fn health(State(host): State<Arc<ServerHost>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        uptime: host.uptime().as_secs_f64(),
        environment: host.environment().to_string(),
    })
}

/// Fetch one order record
pub async fn get_order(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> Result<Json<OrderRecord>, ApiError> {
    let expose = host.exposes_error_detail();
    let id = parse_order_id(&id).map_err(|e| ApiError::new(e, expose))?;

    match host.store.get(&id).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(ApiError::new(StorageError::NotFound { id }, expose)),
        Err(e) => Err(ApiError::new(e, expose)),
    }
}

/// Order history of one store, newest first
pub async fn list_orders(
    State(host): State<Arc<ServerHost>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ListOrdersResponse>, ApiError> {
    let expose = host.exposes_error_detail();

    let Some(store) = query
        .store
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    else {
        return Err(ApiError::new(
            RequestError::BadRequest {
                message: "the store query parameter is required".to_string(),
            },
            expose,
        ));
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);

    let orders = host
        .store
        .list_by_store(&store, limit)
        .await
        .map_err(|e| ApiError::new(e, expose))?;

    Ok(Json(ListOrdersResponse {
        count: orders.len(),
        orders,
        store,
    }))
}

/// Move an order to a new status
///
/// Body: `{"status": "approved", "updatedBy": "manager"}`. `updatedBy`
/// defaults to `system`.
pub async fn update_order_status(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
    JsonPayload(body): JsonPayload,
) -> Result<Json<OrderRecord>, ApiError> {
    let expose = host.exposes_error_detail();
    let bad_request = |message: String| ApiError::new(RequestError::BadRequest { message }, expose);

    let id = parse_order_id(&id).map_err(|e| ApiError::new(e, expose))?;

    let status: OrderStatus = body
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_request("status is required".to_string()))?
        .parse()
        .map_err(bad_request)?;

    let updated_by = body
        .get("updatedBy")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_UPDATED_BY);

    let record = host
        .store
        .update_status(&id, status, updated_by)
        .await
        .map_err(|e| ApiError::new(e, expose))?;

    tracing::info!(
        order_id = %record.id,
        status = %record.status,
        updated_by = %updated_by,
        "Order status updated"
    );

    Ok(Json(record))
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "message": "Route not found",
            "errorCode": "NOT_FOUND",
        })),
    )
}

fn parse_order_id(raw: &str) -> Result<Uuid, RequestError> {
    Uuid::parse_str(raw).map_err(|_| RequestError::BadRequest {
        message: format!("'{}' is not a valid order id", raw),
    })
}
