//! Outbound mail dispatch
//!
//! [`MailDispatcher`] is the seam between the submission pipeline and the
//! mail transport. Two implementations ship with the crate:
//!
//! - [`SmtpDispatcher`]: delivers over SMTP with [lettre](https://lettre.rs)
//! - [`RecordingDispatcher`]: keeps messages in memory, for tests and dry runs
//!
//! Dispatchers never retry. Each call to [`send`](MailDispatcher::send) is
//! exactly one delivery attempt and the caller decides what to do with a
//! [`DeliveryError`].

pub mod recording;
pub mod smtp;

pub use crate::core::error::{DeliveryError, DeliveryErrorCode};
pub use recording::{OutgoingMail, RecordingDispatcher};
pub use smtp::SmtpDispatcher;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Receipt for an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub success: bool,
    /// `Message-ID` header assigned to the message
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
}

impl SendResult {
    pub fn accepted(message_id: String) -> Self {
        Self {
            success: true,
            message_id,
            timestamp: Utc::now(),
        }
    }
}

/// Hands rendered HTML documents to a mail transport
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    /// Deliver `document` as the HTML body of one message to `recipient`
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        document: &str,
    ) -> Result<SendResult, DeliveryError>;

    /// Check that the transport is reachable and accepts our credentials
    ///
    /// Best-effort; callers log a failure and carry on.
    async fn verify_connectivity(&self) -> Result<(), DeliveryError>;
}
