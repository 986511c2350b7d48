//! Infrastructure layer: configuration, background work, outbound mail.

pub mod background;
pub mod config;
pub mod mailer;

pub use background::{TaskOutcome, TaskSupervisor};
pub use config::{AppConfig, Environment, SmtpConfig};
pub use mailer::{MailMessage, Mailer};
