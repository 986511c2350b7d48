//! SMTP transport seam.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpConfig;

/// A failed hand-off to the mail server.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(Box<dyn std::error::Error + Send + Sync>);

impl TransportError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(value: lettre::transport::smtp::Error) -> Self {
        Self::new(value)
    }
}

/// Something that can hand a built message to a mail server.
#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
    async fn send(&self, message: Message) -> Result<(), TransportError>;
}

/// SMTP submission (STARTTLS, AUTH PLAIN) backed by a pooled lettre client.
#[derive(Clone)]
pub struct SmtpMailTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn new(cfg: &SmtpConfig) -> Result<Self, TransportError> {
        let inner = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)?
            .port(cfg.port)
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .authentication(vec![Mechanism::Plain])
            .timeout(Some(cfg.timeout))
            .build();
        Ok(Self { inner })
    }

    /// Open a connection and authenticate, to fail fast at startup.
    pub async fn verify(&self) -> Result<(), TransportError> {
        match self.inner.test_connection().await? {
            true => Ok(()),
            false => Err(TransportError::new("smtp server rejected the connection test")),
        }
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, message: Message) -> Result<(), TransportError> {
        self.inner.send(message).await?;
        Ok(())
    }
}
