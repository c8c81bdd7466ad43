//! Newsletter delivery via SMTP
//!
//! Wraps the `lettre` async transport to send HTML mail. A [`Mailer`]
//! is only constructed when SMTP is configured; callers hold an
//! `Option<Arc<Mailer>>` and report delivery as unavailable otherwise.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::errors::AppError;

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    /// Build a STARTTLS transport against the configured relay.
    /// Credentials are attached only when a username is set.
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::EmailDelivery(format!("SMTP transport setup failed: {e}")))?
            .port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| AppError::EmailDelivery(format!("invalid from address: {e}")))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Send one HTML message to a single recipient.
    pub async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), AppError> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| AppError::EmailDelivery(format!("invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| AppError::EmailDelivery(format!("message build failed: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::EmailDelivery(format!("SMTP send failed: {e}")))?;

        tracing::info!(subject, "Newsletter sent");
        Ok(())
    }
}
