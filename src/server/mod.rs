//! HTTP server for the order form
//!
//! This module provides a `ServerBuilder` that wires the submission pipeline
//! to its collaborators and exposes it over REST:
//! - Form endpoints, each also served under `/api`
//! - Order history and status endpoints
//! - A health check

pub mod builder;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use host::ServerHost;
pub use router::build_router;
