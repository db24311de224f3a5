//! ServerBuilder for fluent API to build the HTTP server

use super::host::ServerHost;
use super::router::build_router;
use crate::config::AppConfig;
use crate::core::{Clock, OrderStore, SystemClock};
use crate::mail::{MailDispatcher, SmtpDispatcher};
use crate::render::TemplateRenderer;
use crate::storage::InMemoryOrderStore;
use crate::submission::SubmissionHandler;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the order form server
///
/// Every collaborator has a default: SMTP delivery from the config, an
/// in-memory order store and the system clock.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(AppConfig::from_env()?)
///     .with_dispatcher(RecordingDispatcher::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    dispatcher: Option<Arc<dyn MailDispatcher>>,
    store: Option<Arc<dyn OrderStore>>,
    clock: Option<Arc<dyn Clock>>,
    organization: Option<String>,
    custom_routes: Vec<Router>,
    verify_on_start: bool,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            dispatcher: None,
            store: None,
            clock: None,
            organization: None,
            custom_routes: Vec::new(),
            verify_on_start: true,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace SMTP delivery
    pub fn with_dispatcher(mut self, dispatcher: impl MailDispatcher + 'static) -> Self {
        self.dispatcher = Some(Arc::new(dispatcher));
        self
    }

    pub fn with_order_store(mut self, store: impl OrderStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Organization named in email headers
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Whether [`serve`](Self::serve) checks the mail server before binding
    pub fn verify_on_start(mut self, verify: bool) -> Self {
        self.verify_on_start = verify;
        self
    }

    /// Build the host holding all service state
    pub fn build_host(&mut self) -> Result<ServerHost> {
        let dispatcher = match self.dispatcher.take() {
            Some(dispatcher) => dispatcher,
            None => Arc::new(SmtpDispatcher::new(&self.config.smtp)?),
        };
        let store = self
            .store
            .take()
            .unwrap_or_else(|| Arc::new(InMemoryOrderStore::new()));
        let clock = self.clock.take().unwrap_or_else(|| Arc::new(SystemClock));

        let mut renderer = TemplateRenderer::new()?;
        if let Some(organization) = self.organization.take() {
            renderer = renderer.with_organization(organization);
        }

        let handler = SubmissionHandler::new(
            dispatcher,
            store.clone(),
            renderer,
            clock,
            self.config.recipient.clone(),
        )
        .with_diagnostic_server(self.config.smtp.server());

        Ok(ServerHost::new(
            Arc::new(handler),
            store,
            self.config.clone(),
        ))
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        Ok(build_router(host, std::mem::take(&mut self.custom_routes)))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Check the mail server connection, unless disabled
    /// - Bind to the configured address
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(mut self) -> Result<()> {
        let addr = self.config.socket_address()?;
        let host = Arc::new(self.build_host()?);

        if self.verify_on_start {
            // A failed check is logged; the server still starts.
            host.handler.verify_transport().await;
        }

        let app = build_router(host.clone(), std::mem::take(&mut self.custom_routes));
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(
            address = %addr,
            environment = %host.environment(),
            recipient = %host.handler.recipient(),
            "Server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DeliveryError, DeliveryErrorCode};
    use crate::mail::RecordingDispatcher;

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.recipient = "supplies@example.com".to_string();
        config.smtp.host = "smtp.example.com".to_string();
        config.smtp.user = "orders@example.com".to_string();
        config
    }

    #[test]
    fn test_new_has_no_collaborators() {
        let builder = ServerBuilder::new();
        assert!(builder.dispatcher.is_none());
        assert!(builder.store.is_none());
        assert!(builder.clock.is_none());
        assert!(builder.custom_routes.is_empty());
        assert!(builder.verify_on_start);
    }

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = ServerBuilder::new()
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    #[test]
    fn test_build_host_uses_config_recipient() {
        let host = ServerBuilder::new()
            .with_config(config())
            .with_dispatcher(RecordingDispatcher::new())
            .build_host()
            .expect("build_host should succeed");

        assert_eq!(host.handler.recipient(), "supplies@example.com");
    }

    #[tokio::test]
    async fn test_build_host_defaults_to_smtp() {
        let host = ServerBuilder::new().with_config(config()).build_host();
        assert!(host.is_ok());
    }

    #[test]
    fn test_build_host_rejects_bad_sender() {
        let mut config = config();
        config.smtp.user = "not an address".to_string();

        let err = ServerBuilder::new()
            .with_config(config)
            .build_host()
            .err()
            .expect("should be Err");
        assert!(err.to_string().contains("invalid sender address"));
    }

    #[tokio::test]
    async fn test_build_with_failing_dispatcher_still_builds() {
        let router = ServerBuilder::new()
            .with_config(config())
            .with_dispatcher(RecordingDispatcher::failing(DeliveryError::new(
                DeliveryErrorCode::Connection,
                "refused",
            )))
            .build();
        assert!(router.is_ok());
    }
}
