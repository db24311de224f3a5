//! The order submission pipeline
//!
//! ```text
//! received ──▶ validated ──▶ rendered ──▶ sent ──▶ acknowledged
//!     │                          │
//!     └──▶ rejected              └──▶ send_failed
//! ```
//!
//! [`SubmissionHandler::handle`] drives one request through these states.
//! Each request is independent and makes at most one send attempt. An order
//! record is written only after the email went out, and the write finishes
//! before the caller is answered.

pub mod ledger;

pub use ledger::{Reservation, ReservationGuard, SubmissionLedger};

use crate::core::{
    Clock, DeliveryError, OrderRecord, OrderStore, OrderSubmission, RequestError, SupplyError,
    ValidationError, validate_order,
};
use crate::mail::{MailDispatcher, SendResult};
use crate::render::{DIAGNOSTIC_SUBJECT, DiagnosticDetails, TemplateRenderer};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Lifecycle states of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Received,
    Validated,
    Rendered,
    Sent,
    Acknowledged,
    Rejected,
    SendFailed,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Acknowledged | SubmissionState::Rejected | SubmissionState::SendFailed
        )
    }
}

/// Result of an acknowledged submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    pub message_id: String,
    /// Id of the stored order, if the write succeeded
    pub order_id: Option<Uuid>,
    pub persisted: bool,
    /// Set when this answer replays an earlier submission with the same request id
    pub duplicate: bool,
    pub timestamp: DateTime<Utc>,
}

/// Terminal outcome of one submission
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Acknowledged(Acknowledgement),
    Rejected(ValidationError),
    SendFailed(DeliveryError),
}

impl SubmissionOutcome {
    pub fn state(&self) -> SubmissionState {
        match self {
            SubmissionOutcome::Acknowledged(_) => SubmissionState::Acknowledged,
            SubmissionOutcome::Rejected(_) => SubmissionState::Rejected,
            SubmissionOutcome::SendFailed(_) => SubmissionState::SendFailed,
        }
    }
}

/// Orchestrates validation, rendering, dispatch and persistence
pub struct SubmissionHandler {
    dispatcher: Arc<dyn MailDispatcher>,
    store: Arc<dyn OrderStore>,
    renderer: TemplateRenderer,
    clock: Arc<dyn Clock>,
    ledger: SubmissionLedger,
    recipient: String,
    diagnostic: DiagnosticDetails,
}

impl SubmissionHandler {
    pub fn new(
        dispatcher: Arc<dyn MailDispatcher>,
        store: Arc<dyn OrderStore>,
        renderer: TemplateRenderer,
        clock: Arc<dyn Clock>,
        recipient: impl Into<String>,
    ) -> Self {
        let recipient = recipient.into();
        Self {
            dispatcher,
            store,
            renderer,
            clock,
            ledger: SubmissionLedger::default(),
            diagnostic: DiagnosticDetails {
                server: String::new(),
                recipient: recipient.clone(),
            },
            recipient,
        }
    }

    /// Set the server name shown in diagnostic emails
    pub fn with_diagnostic_server(mut self, server: impl Into<String>) -> Self {
        self.diagnostic.server = server.into();
        self
    }

    /// Replace the de-duplication ledger
    pub fn with_ledger(mut self, ledger: SubmissionLedger) -> Self {
        self.ledger = ledger;
        self
    }

    /// Where order emails are delivered
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Run one raw payload through the pipeline
    ///
    /// Rejections and delivery failures are outcomes, not errors. `Err` is
    /// returned for a request id that is still in flight and for failures
    /// that should never happen, such as a broken template.
    pub async fn handle(&self, payload: &Value) -> Result<SubmissionOutcome, SupplyError> {
        let now = self.clock.now();

        let submission = match validate_order(payload, now.date_naive()) {
            Ok(submission) => submission,
            Err(rejection) => {
                tracing::warn!(errors = ?rejection.errors, "Rejected order submission");
                return Ok(SubmissionOutcome::Rejected(rejection));
            }
        };

        let guard = match submission.request_id() {
            None => None,
            Some(id) => match self.ledger.reserve(id) {
                Reservation::Fresh => Some(ReservationGuard::new(&self.ledger, id)),
                Reservation::InFlight => {
                    tracing::warn!(request_id = %id, "Duplicate submission while first is in flight");
                    return Err(RequestError::Duplicate {
                        request_id: id.to_string(),
                    }
                    .into());
                }
                Reservation::Completed(prior) => {
                    tracing::info!(
                        request_id = %id,
                        message_id = %prior.message_id,
                        "Replaying acknowledged submission"
                    );
                    return Ok(SubmissionOutcome::Acknowledged(Acknowledgement {
                        duplicate: true,
                        ..prior
                    }));
                }
            },
        };

        let outcome = self.dispatch(submission, now).await;

        // Dropping the guard on any other outcome frees the id for a retry.
        if let (Some(guard), Ok(SubmissionOutcome::Acknowledged(ack))) = (guard, &outcome) {
            guard.complete(ack.clone());
        }

        outcome
    }

    async fn dispatch(
        &self,
        submission: OrderSubmission,
        now: DateTime<Local>,
    ) -> Result<SubmissionOutcome, SupplyError> {
        let document = self
            .renderer
            .render(&submission, now)
            .map_err(|e| SupplyError::Unexpected(format!("order email rendering failed: {}", e)))?;
        let subject = TemplateRenderer::subject_for(&submission);

        tracing::debug!(
            store = %submission.store(),
            items = submission.item_count(),
            "Sending order email"
        );

        let sent = match self.dispatcher.send(&self.recipient, &subject, &document).await {
            Ok(sent) => sent,
            Err(error) => {
                tracing::error!(
                    store = %submission.store(),
                    error_code = %error.code,
                    error = %error.message,
                    "Order email could not be sent"
                );
                return Ok(SubmissionOutcome::SendFailed(error));
            }
        };

        tracing::info!(
            store = %submission.store(),
            employee = %submission.employee_name(),
            message_id = %sent.message_id,
            "Order email sent"
        );

        let record = OrderRecord::sent(submission, sent.message_id.clone(), now.with_timezone(&Utc));
        let order_id = match self.store.create(record).await {
            Ok(stored) => Some(stored.id),
            Err(e) => {
                tracing::error!(
                    message_id = %sent.message_id,
                    error = %e,
                    "Order email sent but the order could not be stored"
                );
                None
            }
        };

        Ok(SubmissionOutcome::Acknowledged(Acknowledgement {
            message_id: sent.message_id,
            order_id,
            persisted: order_id.is_some(),
            duplicate: false,
            timestamp: sent.timestamp,
        }))
    }

    /// Render and send the diagnostic email
    pub async fn handle_diagnostic(&self) -> Result<SendResult, SupplyError> {
        let document = self
            .renderer
            .render_diagnostic(&self.diagnostic, self.clock.now())
            .map_err(|e| {
                SupplyError::Unexpected(format!("diagnostic email rendering failed: {}", e))
            })?;

        let sent = self
            .dispatcher
            .send(&self.recipient, DIAGNOSTIC_SUBJECT, &document)
            .await
            .inspect_err(|e| {
                tracing::error!(error_code = %e.code, error = %e.message, "Diagnostic email failed")
            })?;

        tracing::info!(message_id = %sent.message_id, "Diagnostic email sent");
        Ok(sent)
    }

    /// Check the mail transport, logging the result
    pub async fn verify_transport(&self) -> bool {
        match self.dispatcher.verify_connectivity().await {
            Ok(()) => {
                tracing::info!("Email server is ready to send messages");
                true
            }
            Err(e) => {
                tracing::warn!(
                    error_code = %e.code,
                    error = %e.message,
                    "Email server connectivity check failed; submissions will still be attempted"
                );
                false
            }
        }
    }
}
