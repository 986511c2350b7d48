//! Outbound email: templates, SMTP transport, and retrying delivery.
//!
//! ## Components
//!
//! - `TemplateRegistry`: compiled templates, each defining `subject`,
//!   `plainBody` and `htmlBody` blocks
//! - `MailTransport`: seam over the SMTP client (`SmtpMailTransport` in production)
//! - `Mailer`: renders, builds the MIME message, and retries transport failures
//! - `RetryPolicy`: attempt count and wait between attempts

pub mod dispatcher;
pub mod retry;
pub mod templates;
pub mod transport;

pub use dispatcher::{MailError, MailMessage, Mailer};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use templates::{RenderedMail, TemplateError, TemplateRegistry};
pub use transport::{MailTransport, SmtpMailTransport, TransportError};
