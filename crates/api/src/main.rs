use std::sync::Arc;

use anyhow::Context;

use bedrock_api::app::routes::users::WELCOME_TEMPLATE;
use bedrock_api::{server, AppState};
use bedrock_infra::mailer::{SmtpMailTransport, TemplateRegistry};
use bedrock_infra::{AppConfig, Mailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bedrock_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let templates = Arc::new(TemplateRegistry::embedded().context("failed to load email templates")?);
    anyhow::ensure!(
        templates.contains(WELCOME_TEMPLATE),
        "email template {WELCOME_TEMPLATE:?} is not embedded"
    );
    let transport = SmtpMailTransport::new(&config.smtp).context("invalid smtp settings")?;
    transport
        .verify()
        .await
        .context("failed to connect to the smtp server")?;
    tracing::info!(host = %config.smtp.host, port = config.smtp.port, "smtp server reachable");

    let mailer = Mailer::new(templates, Arc::new(transport), config.smtp.sender.clone());
    let state = AppState::new(config.env, mailer);

    server::run(config.port, state).await
}
