//! Core module containing the domain types, rules and traits of the service

pub mod clock;
pub mod error;
pub mod order;
pub mod service;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{
    ApiError, ConfigError, DeliveryError, DeliveryErrorCode, ErrorResponse, RequestError,
    StorageError, SupplyError, ValidationError,
};
pub use order::{OrderRecord, OrderStatus, OrderSubmission, StatusChange, SupplyItem};
pub use service::OrderStore;
pub use validation::validate_order;
