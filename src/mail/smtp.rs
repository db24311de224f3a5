//! SMTP delivery with lettre

use super::{DeliveryError, DeliveryErrorCode, MailDispatcher, SendResult};
use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::{self, AsyncSmtpTransportBuilder};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

/// SMTP reply codes that mean the credentials were refused
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// Mail dispatcher backed by a pooled async SMTP transport
///
/// With `secure` set the connection uses implicit TLS (usually port 465);
/// otherwise it connects in plain text and upgrades with STARTTLS whenever the
/// server offers it.
pub struct SmtpDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpDispatcher {
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let address: Address = config.user.parse().map_err(|e| {
            DeliveryError::new(
                DeliveryErrorCode::Envelope,
                format!("invalid sender address '{}': {}", config.user, e),
            )
        })?;
        let sender = Mailbox::new(Some(config.from_name.clone()), address);

        let mut builder = transport_builder(config)?
            .port(config.port)
            .timeout(Some(config.timeout()));
        if !config.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ));
        }

        tracing::debug!(
            host = %config.host,
            port = config.port,
            secure = config.secure,
            "Configured SMTP transport"
        );

        Ok(Self {
            transport: builder.build(),
            sender,
        })
    }

    fn message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.sender.email.domain())
    }
}

fn transport_builder(config: &SmtpConfig) -> Result<AsyncSmtpTransportBuilder, DeliveryError> {
    if config.secure {
        return AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host).map_err(delivery_error);
    }

    let tls = TlsParameters::new(config.host.clone()).map_err(delivery_error)?;
    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        .tls(Tls::Opportunistic(tls)))
}

/// Classify a transport failure
pub(crate) fn delivery_error(err: smtp::Error) -> DeliveryError {
    let code = if err.is_timeout() {
        DeliveryErrorCode::Timeout
    } else if let Some(status) = err.status() {
        let status = status.to_string();
        if AUTH_FAILURE_CODES.contains(&status.as_str()) {
            DeliveryErrorCode::Auth
        } else if err.is_transient() {
            DeliveryErrorCode::Transient
        } else {
            DeliveryErrorCode::Envelope
        }
    } else {
        DeliveryErrorCode::Connection
    };

    DeliveryError::new(code, err.to_string())
}

#[async_trait]
impl MailDispatcher for SmtpDispatcher {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        document: &str,
    ) -> Result<SendResult, DeliveryError> {
        let to: Mailbox = recipient.parse().map_err(|e| {
            DeliveryError::new(
                DeliveryErrorCode::Envelope,
                format!("invalid recipient address '{}': {}", recipient, e),
            )
        })?;

        let message_id = self.message_id();
        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(subject)
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(document.to_string())
            .map_err(|e| DeliveryError::new(DeliveryErrorCode::Message, e.to_string()))?;

        let response = self.transport.send(message).await.map_err(delivery_error)?;
        tracing::debug!(
            message_id = %message_id,
            reply = %response.code(),
            "SMTP server accepted message"
        );

        Ok(SendResult::accepted(message_id))
    }

    async fn verify_connectivity(&self) -> Result<(), DeliveryError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(DeliveryError::new(
                DeliveryErrorCode::Connection,
                "SMTP server did not answer the connection test",
            )),
            Err(e) => Err(delivery_error(e)),
        }
    }
}
