//! Templated mail delivery with bounded retries.

use std::sync::Arc;

use lettre::message::{Mailbox, MultiPart};
use lettre::Message;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::retry::RetryPolicy;
use super::templates::{TemplateError, TemplateRegistry};
use super::transport::{MailTransport, TransportError};

/// One email to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub recipient: String,
    /// Template file name, e.g. `user_welcome.tmpl`.
    pub template: String,
    pub data: serde_json::Value,
}

impl MailMessage {
    pub fn new(
        recipient: impl Into<String>,
        template: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            template: template.into(),
            data,
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    /// Template missing or broken; retrying cannot help.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Malformed `To` or `From` address; retrying cannot help.
    #[error("invalid {header} address {value:?}: {source}")]
    Address {
        header: &'static str,
        value: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    /// Every delivery attempt failed; carries the last error.
    #[error("mail delivery failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },
}

/// Renders email templates and delivers them through a [`MailTransport`].
///
/// Cheap to clone; typically cloned into a supervised background task so
/// the retry backoff never holds up a request.
#[derive(Clone)]
pub struct Mailer {
    templates: Arc<TemplateRegistry>,
    transport: Arc<dyn MailTransport>,
    sender: String,
    retry: RetryPolicy,
}

impl Mailer {
    pub fn new(
        templates: Arc<TemplateRegistry>,
        transport: Arc<dyn MailTransport>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            transport,
            sender: sender.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Render `message` and deliver it.
    ///
    /// Template and address problems fail immediately. Transport failures
    /// are retried according to the retry policy; once attempts run out the
    /// last transport error is returned.
    pub async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let email = self.build(message)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.send(email.clone()).await {
                Ok(()) => {
                    info!(
                        template = %message.template,
                        attempt,
                        "mail delivered"
                    );
                    return Ok(());
                }
                Err(e) if self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        template = %message.template,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "mail delivery failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(
                        template = %message.template,
                        attempt,
                        error = %e,
                        "mail delivery failed; giving up"
                    );
                    return Err(MailError::Transport {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }

    fn build(&self, message: &MailMessage) -> Result<Message, MailError> {
        let rendered = self.templates.render(&message.template, &message.data)?;
        debug!(template = %message.template, "mail template rendered");

        let to = parse_mailbox("To", &message.recipient)?;
        let from = parse_mailbox("From", &self.sender)?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(rendered.subject)
            .multipart(MultiPart::alternative_plain_html(
                rendered.plain_body,
                rendered.html_body,
            ))?;
        Ok(email)
    }
}

fn parse_mailbox(header: &'static str, value: &str) -> Result<Mailbox, MailError> {
    value.parse().map_err(|source| MailError::Address {
        header,
        value: value.to_string(),
        source,
    })
}
