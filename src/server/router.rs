//! Route table for the order form API

use super::handlers::{
    get_order, health, list_orders, not_found, submit_order, test_email, update_order_status,
};
use super::host::ServerHost;
use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the router from a host
///
/// Each form endpoint is served both at the root and under `/api`:
/// - POST /submit-order, /api/submit-order - Submission pipeline
/// - POST /test-email, /api/test-email - Diagnostic send
/// - GET /health, /api/health - Liveness
/// - GET /api/orders?store={store}&limit={n} - Store order history
/// - GET /api/orders/{id} - One order
/// - PATCH /api/orders/{id}/status - Status change
pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Router {
    let form_routes = Router::new()
        .route("/submit-order", post(submit_order))
        .route("/test-email", post(test_email))
        .route("/health", get(health));

    let order_routes = Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status));

    let mut app = Router::new()
        .merge(form_routes.clone())
        .nest("/api", form_routes.merge(order_routes))
        .fallback(not_found)
        .with_state(host);

    for custom_router in custom_routes {
        app = app.merge(custom_router);
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
