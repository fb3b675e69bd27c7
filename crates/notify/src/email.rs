//! SMTP email notifier via `lettre` with TLS support.
//!
//! Each payload is sent as a plain-text email to its own recipient.
//! Supports STARTTLS and implicit TLS connections.

use crate::traits::{NotificationPayload, Notifier, NotifyError};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use wastewatch_core::config::SmtpConfig;

/// Sends notifications as emails via SMTP.
#[derive(Debug)]
pub struct EmailNotifier {
    /// Async SMTP transport for sending emails.
    transport: AsyncSmtpTransport<Tokio1Executor>,
    /// Sender mailbox.
    from: Mailbox,
}

impl EmailNotifier {
    /// Build an `EmailNotifier` from SMTP settings.
    ///
    /// - `smtp_host`: SMTP server hostname.
    /// - `smtp_port`: Optional port (defaults to 587).
    /// - `tls`: Port 465 always uses implicit TLS; otherwise `true` enables
    ///   STARTTLS and `false` sends in the clear.
    /// - `from`: Sender address (e.g. `"Mess Office <mess@example.com>"`).
    ///
    /// SMTP credentials are resolved from the `SMTP_USERNAME` and `SMTP_PASSWORD`
    /// environment variables. If both are set, they are passed to the transport;
    /// otherwise the connection is unauthenticated.
    pub fn from_config(
        smtp_host: &str,
        smtp_port: Option<u16>,
        tls: bool,
        from: &str,
    ) -> Result<Self, NotifyError> {
        let from_mailbox: Mailbox = from
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let port = smtp_port.unwrap_or(587);

        let mut builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
                .map_err(|e| NotifyError::Config(e.to_string()))?
                .port(port)
        } else if tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
                .map_err(|e| NotifyError::Config(e.to_string()))?
                .port(port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host).port(port)
        };

        if let (Ok(username), Ok(password)) =
            (std::env::var("SMTP_USERNAME"), std::env::var("SMTP_PASSWORD"))
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from: from_mailbox,
        })
    }

    /// Build from the `smtp` config section.
    pub fn from_smtp_config(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| NotifyError::Config("SMTP_HOST is not set".to_string()))?;
        Self::from_config(host, config.port, config.tls, &config.from)
    }

    fn build_message(&self, payload: &NotificationPayload) -> Result<Message, NotifyError> {
        let to: Mailbox = payload.contact_address.parse().map_err(
            |e: lettre::address::AddressError| NotifyError::InvalidAddress {
                address: payload.contact_address.clone(),
                reason: e.to_string(),
            },
        )?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&payload.subject_line)
            .header(ContentType::TEXT_PLAIN)
            .body(payload.body_text.clone())
            .map_err(|e| NotifyError::Smtp(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let email = self.build_message(payload)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        tracing::debug!(
            channel = "email",
            to = %payload.contact_address,
            subject = %payload.subject_line,
            "email accepted by SMTP server"
        );

        Ok(())
    }

    /// Returns `"email"`.
    fn channel_name(&self) -> &str {
        "email"
    }
}
