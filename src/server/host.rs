//! Server host holding the state shared by every request
//!
//! The host is built once by [`ServerBuilder`](super::ServerBuilder) and
//! handed to the router behind an `Arc`. Handlers receive everything they
//! need from it; there is no global state.

use crate::config::{AppConfig, Environment};
use crate::core::OrderStore;
use crate::submission::SubmissionHandler;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Host context containing all service state
pub struct ServerHost {
    /// The submission pipeline
    pub handler: Arc<SubmissionHandler>,

    /// Order records written by the pipeline
    pub store: Arc<dyn OrderStore>,

    /// Configuration the host was built from
    pub config: Arc<AppConfig>,

    started_at: Instant,
}

impl ServerHost {
    pub fn new(
        handler: Arc<SubmissionHandler>,
        store: Arc<dyn OrderStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            handler,
            store,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    pub fn environment(&self) -> Environment {
        self.config.environment
    }

    /// Whether error responses include raw failure details
    pub fn exposes_error_detail(&self) -> bool {
        self.config.environment.exposes_error_detail()
    }

    /// Time since the host was built
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SystemClock;
    use crate::mail::RecordingDispatcher;
    use crate::render::TemplateRenderer;
    use crate::storage::InMemoryOrderStore;

    fn host(environment: Environment) -> ServerHost {
        let store: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
        let handler = SubmissionHandler::new(
            Arc::new(RecordingDispatcher::new()),
            store.clone(),
            TemplateRenderer::new().unwrap(),
            Arc::new(SystemClock),
            "supplies@example.com",
        );
        let config = AppConfig {
            environment,
            ..AppConfig::default()
        };
        ServerHost::new(Arc::new(handler), store, config)
    }

    #[test]
    fn test_detail_policy_follows_environment() {
        assert!(host(Environment::Development).exposes_error_detail());
        assert!(host(Environment::Test).exposes_error_detail());
        assert!(!host(Environment::Production).exposes_error_detail());
    }

    #[test]
    fn test_uptime_advances() {
        let host = host(Environment::Test);
        let first = host.uptime();
        assert!(host.uptime() >= first);
    }
}
