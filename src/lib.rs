//! # Supply Orders
//!
//! Backend for the store supply order form. Employees submit what their store
//! needs; the service validates the order, renders it as an HTML email,
//! delivers it over SMTP and keeps a record of it.
//!
//! ## Features
//!
//! - **Field-by-field validation**: every violated rule is reported at once
//! - **Escaped HTML emails**: tera templates with autoescaping
//! - **Classified delivery failures**: SMTP errors mapped to stable codes
//! - **Order history**: records with a status lifecycle, listed per store
//! - **Safe retries**: an optional client `requestId` prevents double sends
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use supply::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     config.validate()?;
//!
//!     ServerBuilder::new()
//!         .with_config(config)
//!         .with_order_store(InMemoryOrderStore::new())
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod logging;
pub mod mail;
pub mod render;
pub mod server;
pub mod storage;
pub mod submission;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ApiError, Clock, DeliveryError, DeliveryErrorCode, FixedClock, OrderRecord, OrderStatus,
        OrderStore, OrderSubmission, StatusChange, StorageError, SupplyError, SupplyItem,
        SystemClock, ValidationError, validate_order,
    };

    // === Pipeline ===
    pub use crate::mail::{MailDispatcher, RecordingDispatcher, SendResult, SmtpDispatcher};
    pub use crate::render::TemplateRenderer;
    pub use crate::submission::{Acknowledgement, SubmissionHandler, SubmissionOutcome};

    // === Storage ===
    pub use crate::storage::InMemoryOrderStore;

    // === Config ===
    pub use crate::config::{AppConfig, Environment, SmtpConfig};
    pub use crate::logging::{LogFormat, init_logging};

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
