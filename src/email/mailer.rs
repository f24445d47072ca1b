use async_trait::async_trait;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use log::{info, warn};
use crate::core::SmtpConfig;
use crate::errors::AppError;

/// Outbound mail seam. Domain code only sees this trait, so tests and
/// mail-less environments run with the no-op implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: String) -> Result<(), AppError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let creds = Credentials::new(config.user.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|err| AppError::ProcessingError(format!("Unable to build smtp transport: {}", err)))?
            .port(config.port)
            .credentials(creds)
            .build();
        info!("Created smtp client for {}:{}.", config.host, config.port);
        Ok(SmtpMailer {
            transport,
            from_address: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: String) -> Result<(), AppError> {
        let message = Message::builder()
            .from(self.from_address.parse().map_err(|err| {
                AppError::ProcessingError(format!("Invalid from address: {}", err))
            })?)
            .to(to.parse().map_err(|err| {
                AppError::ProcessingError(format!("Invalid recipient address: {}", err))
            })?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|err| AppError::ProcessingError(format!("Unable to build mail: {}", err)))?;

        self.transport.send(message).await.map_err(|err| {
            AppError::ProcessingError(format!("Unable to send mail: {}", err))
        })?;
        info!("Sent mail '{}' to {}.", subject, to);
        Ok(())
    }
}

/// Used when smtp is disabled in the config, and in tests.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _html: String) -> Result<(), AppError> {
        warn!("Mail delivery is disabled, dropping mail '{}' to {}.", subject, to);
        Ok(())
    }
}
