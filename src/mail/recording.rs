//! In-memory mail dispatcher for testing and dry runs

use super::{DeliveryError, MailDispatcher, SendResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A message handed to the [`RecordingDispatcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub recipient: String,
    pub subject: String,
    pub html: String,
    pub message_id: String,
}

/// Dispatcher that records every message instead of delivering it
///
/// Can be scripted to fail with a chosen [`DeliveryError`]. Failed attempts
/// are counted but not recorded as sent. Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
    attempts: Arc<Mutex<usize>>,
    failure: Arc<Mutex<Option<DeliveryError>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dispatcher whose sends and connectivity checks all fail with `error`
    pub fn failing(error: DeliveryError) -> Self {
        Self {
            failure: Arc::new(Mutex::new(Some(error))),
            ..Self::default()
        }
    }

    /// Make later calls fail with `error`, or succeed again with `None`
    pub async fn set_failure(&self, error: Option<DeliveryError>) {
        *self.failure.lock().await = error;
    }

    /// Messages accepted so far, oldest first
    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().await.clone()
    }

    /// Number of send attempts, successful or not
    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }
}

#[async_trait]
impl MailDispatcher for RecordingDispatcher {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        document: &str,
    ) -> Result<SendResult, DeliveryError> {
        *self.attempts.lock().await += 1;

        if let Some(error) = self.failure.lock().await.clone() {
            return Err(error);
        }

        let message_id = format!("<{}@recording.invalid>", Uuid::new_v4());
        tracing::info!(
            recipient = %recipient,
            subject = %subject,
            message_id = %message_id,
            "Recorded outgoing mail"
        );

        self.sent.lock().await.push(OutgoingMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html: document.to_string(),
            message_id: message_id.clone(),
        });

        Ok(SendResult::accepted(message_id))
    }

    async fn verify_connectivity(&self) -> Result<(), DeliveryError> {
        match self.failure.lock().await.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
