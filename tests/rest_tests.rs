//! End-to-end tests of the HTTP API
//!
//! These tests verify the complete flow from HTTP request to response using
//! a recording dispatcher and an in-memory store.

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Local, TimeZone};
use serde_json::{Value, json};
use supply::prelude::*;

// =============================================================================
// Test Server
// =============================================================================

struct TestApp {
    server: TestServer,
    dispatcher: RecordingDispatcher,
    store: InMemoryOrderStore,
}

fn config(environment: Environment) -> AppConfig {
    let mut config = AppConfig {
        environment,
        recipient: "supplies@example.com".to_string(),
        ..AppConfig::default()
    };
    config.smtp.host = "smtp.example.com".to_string();
    config.smtp.user = "orders@example.com".to_string();
    config
}

fn create_test_app_with(environment: Environment, dispatcher: RecordingDispatcher) -> TestApp {
    let store = InMemoryOrderStore::new();
    let app = ServerBuilder::new()
        .with_config(config(environment))
        .with_dispatcher(dispatcher.clone())
        .with_order_store(store.clone())
        .with_clock(FixedClock::new(
            Local.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap(),
        ))
        .build()
        .expect("Failed to build router");

    TestApp {
        server: TestServer::new(app).expect("Failed to create test server"),
        dispatcher,
        store,
    }
}

fn create_test_app() -> TestApp {
    create_test_app_with(Environment::Development, RecordingDispatcher::new())
}

fn order() -> Value {
    json!({
        "employeeName": "Jane Doe",
        "store": "Archer",
        "orderDate": "2999-01-01",
        "officeSupplies": [{"name": "Pens", "quantity": 5}],
        "cleaningSupplies": []
    })
}

// =============================================================================
// Submit Order
// =============================================================================

mod submit_order_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_order_on_both_paths() {
        let app = create_test_app();

        for path in ["/submit-order", "/api/submit-order"] {
            let response = app.server.post(path).json(&order()).await;
            response.assert_status_ok();

            let body: Value = response.json();
            assert_eq!(body["success"], true);
            assert_eq!(
                body["message"],
                "Order submitted successfully! Email has been sent."
            );
            assert!(body["messageId"].as_str().unwrap().starts_with('<'));
            assert_eq!(body["persisted"], true);
            assert!(body["orderId"].is_string());
            assert!(body["timestamp"].is_string());
        }

        assert_eq!(app.dispatcher.sent().await.len(), 2);
        assert_eq!(app.store.len().await, 2);
    }

    #[tokio::test]
    async fn test_validation_failure_returns_400() {
        let app = create_test_app();

        let response = app
            .server
            .post("/api/submit-order")
            .json(&json!({"store": "Archer", "orderDate": "2026-03-13"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(
            body["errors"],
            json!([
                "Employee name is required and must be a non-empty string",
                "Order date cannot be in the past",
                "At least one valid supply item with name and quantity is required"
            ])
        );
        assert_eq!(app.dispatcher.attempts().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let app = create_test_app();

        let response = app
            .server
            .post("/submit-order")
            .text("{\"employeeName\": ")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert!(
            body["errors"][0]
                .as_str()
                .unwrap()
                .starts_with("Request body must be valid JSON")
        );
    }

    #[tokio::test]
    async fn test_send_failure_in_development_exposes_detail() {
        let app = create_test_app_with(
            Environment::Development,
            RecordingDispatcher::failing(DeliveryError::new(
                DeliveryErrorCode::Auth,
                "535 5.7.8 Username and Password not accepted",
            )),
        );

        let response = app.server.post("/submit-order").json(&order()).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["errorCode"], "EAUTH");
        assert_eq!(
            body["message"],
            "Email service is temporarily unavailable. Please try again later."
        );
        assert_eq!(body["error"], "535 5.7.8 Username and Password not accepted");
        assert!(app.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_send_failure_in_production_hides_detail() {
        let app = create_test_app_with(
            Environment::Production,
            RecordingDispatcher::failing(DeliveryError::new(
                DeliveryErrorCode::Envelope,
                "550 mailbox orders@internal.example unavailable",
            )),
        );

        let response = app.server.post("/submit-order").json(&order()).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["errorCode"], "EENVELOPE");
        assert_eq!(
            body["message"],
            "Invalid email configuration. Please contact support."
        );
        assert!(!body["error"].as_str().unwrap_or("").contains("internal.example"));
    }

    #[tokio::test]
    async fn test_repeated_request_id_is_replayed() {
        let app = create_test_app();
        let mut payload = order();
        payload["requestId"] = json!("form-123");

        let first: Value = app.server.post("/submit-order").json(&payload).await.json();
        let second: Value = app.server.post("/submit-order").json(&payload).await.json();

        assert_eq!(first["messageId"], second["messageId"]);
        assert_eq!(first["duplicate"], false);
        assert_eq!(second["duplicate"], true);
        assert_eq!(app.dispatcher.sent().await.len(), 1);
    }
}

// =============================================================================
// Test Email and Health
// =============================================================================

mod diagnostic_tests {
    use super::*;

    #[tokio::test]
    async fn test_test_email_on_both_paths() {
        let app = create_test_app();

        for path in ["/test-email", "/api/test-email"] {
            let response = app.server.post(path).await;
            response.assert_status_ok();

            let body: Value = response.json();
            assert_eq!(body["success"], true);
            assert_eq!(body["message"], "Test email sent successfully!");
            assert_eq!(body["recipients"], "supplies@example.com");
        }

        let sent = app.dispatcher.sent().await;
        assert_eq!(sent.len(), 2);
        assert!(sent[0].html.contains("smtp.example.com:587"));
    }

    #[tokio::test]
    async fn test_test_email_failure_always_exposes_detail() {
        let app = create_test_app_with(
            Environment::Production,
            RecordingDispatcher::failing(DeliveryError::new(
                DeliveryErrorCode::Connection,
                "connect ECONNREFUSED 10.1.2.3:587",
            )),
        );

        let response = app.server.post("/test-email").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Test email failed");
        assert_eq!(body["error"], "connect ECONNREFUSED 10.1.2.3:587");
        assert_eq!(body["errorCode"], "ECONNECTION");
    }

    #[tokio::test]
    async fn test_health_on_both_paths() {
        let app = create_test_app_with(Environment::Test, RecordingDispatcher::new());

        for path in ["/health", "/api/health"] {
            let response = app.server.get(path).await;
            response.assert_status_ok();

            let body: Value = response.json();
            assert_eq!(body["status"], "OK");
            assert_eq!(body["environment"], "test");
            assert!(body["uptime"].as_f64().unwrap() >= 0.0);
            assert!(body["timestamp"].is_string());
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = create_test_app();
        let response = app.server.get("/nope").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

// =============================================================================
// Order History
// =============================================================================

mod order_history_tests {
    use super::*;

    async fn submit(app: &TestApp, store: &str) -> String {
        let mut payload = order();
        payload["store"] = json!(store);
        let body: Value = app.server.post("/submit-order").json(&payload).await.json();
        body["orderId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_get_order() {
        let app = create_test_app();
        let id = submit(&app, "Archer").await;

        let response = app.server.get(&format!("/api/orders/{}", id)).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["employeeName"], "Jane Doe");
        assert_eq!(body["store"], "Archer");
        assert_eq!(body["status"], "pending");
        assert_eq!(body["emailSent"], true);
        assert_eq!(body["statusHistory"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_order_is_404() {
        let app = create_test_app();

        let response = app
            .server
            .get(&format!("/api/orders/{}", Uuid::new_v4()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["errorCode"], "ORDER_NOT_FOUND");

        let response = app.server.get("/api/orders/not-a-uuid").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_orders_by_store() {
        let app = create_test_app();
        submit(&app, "Archer").await;
        submit(&app, "Archer").await;
        submit(&app, "Bellaire").await;

        let response = app
            .server
            .get("/api/orders")
            .add_query_param("store", "Archer")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 2);
        assert_eq!(body["store"], "Archer");

        let response = app
            .server
            .get("/api/orders")
            .add_query_param("store", "Archer")
            .add_query_param("limit", 1)
            .await;
        let body: Value = response.json();
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn test_list_orders_requires_store() {
        let app = create_test_app();
        let response = app.server.get("/api/orders").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_order_status() {
        let app = create_test_app();
        let id = submit(&app, "Archer").await;

        let response = app
            .server
            .patch(&format!("/api/orders/{}/status", id))
            .json(&json!({"status": "approved", "updatedBy": "regional-manager"}))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "approved");
        let history = body["statusHistory"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1]["status"], "approved");
        assert_eq!(history[1]["updatedBy"], "regional-manager");
    }

    #[tokio::test]
    async fn test_update_order_status_rejects_unknown_status() {
        let app = create_test_app();
        let id = submit(&app, "Archer").await;

        let response = app
            .server
            .patch(&format!("/api/orders/{}/status", id))
            .json(&json!({"status": "lost"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
