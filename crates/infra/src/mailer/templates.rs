//! Email template table.
//!
//! Templates are compiled into the binary and loaded into a single
//! [`TemplateRegistry`] at startup. The registry is immutable afterwards and
//! shared through an `Arc`.

use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::Serialize;
use thiserror::Error;

/// Blocks every email template must define.
pub const SUBJECT_BLOCK: &str = "subject";
pub const PLAIN_BODY_BLOCK: &str = "plainBody";
pub const HTML_BODY_BLOCK: &str = "htmlBody";

/// Templates shipped with the binary, addressed by file name.
const EMBEDDED: &[(&str, &str)] = &[
    (
        "user_welcome.tmpl",
        include_str!("../../templates/user_welcome.tmpl"),
    ),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("email template {0:?} not found")]
    NotFound(String),

    #[error("email template {template:?} does not define block {block:?}")]
    MissingBlock { template: String, block: &'static str },

    #[error("email template {template:?} failed to render: {source}")]
    Render {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("email template {template:?} failed to compile: {source}")]
    Compile {
        template: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Output of rendering one email template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub plain_body: String,
    pub html_body: String,
}

/// Immutable set of compiled email templates.
#[derive(Debug)]
pub struct TemplateRegistry {
    env: Environment<'static>,
}

impl TemplateRegistry {
    /// Registry holding the templates compiled into the binary.
    pub fn embedded() -> Result<Self, TemplateError> {
        Self::from_sources(EMBEDDED.iter().copied())
    }

    /// Registry built from `(name, source)` pairs.
    pub fn from_sources(
        sources: impl IntoIterator<Item = (&'static str, &'static str)>,
    ) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        for (name, source) in sources {
            env.add_template(name, source)
                .map_err(|source| TemplateError::Compile {
                    template: name.to_string(),
                    source,
                })?;
        }

        Ok(Self { env })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// Render the subject, plain-text and HTML blocks of `name` with `data`.
    pub fn render<S: Serialize>(&self, name: &str, data: S) -> Result<RenderedMail, TemplateError> {
        let render_err = |source: minijinja::Error| TemplateError::Render {
            template: name.to_string(),
            source,
        };

        let tmpl = self.env.get_template(name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => TemplateError::NotFound(name.to_string()),
            _ => render_err(e),
        })?;
        let mut state = tmpl.eval_to_state(data).map_err(render_err)?;

        let mut block = |block: &'static str| {
            state.render_block(block).map_err(|e| match e.kind() {
                ErrorKind::UnknownBlock => TemplateError::MissingBlock {
                    template: name.to_string(),
                    block,
                },
                _ => render_err(e),
            })
        };

        Ok(RenderedMail {
            subject: block(SUBJECT_BLOCK)?.trim().to_string(),
            plain_body: block(PLAIN_BODY_BLOCK)?,
            html_body: block(HTML_BODY_BLOCK)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_templates_define_every_block() {
        let registry = TemplateRegistry::embedded().unwrap();

        let welcome = registry.render("user_welcome.tmpl", json!({"userID": 42})).unwrap();
        assert_eq!(welcome.subject, "Welcome to Bedrock!");
        assert!(welcome.plain_body.contains("your user ID number is 42."));
        assert!(welcome.html_body.contains("<p>For future reference, your user ID number is 42.</p>"));
    }

    #[test]
    fn interpolated_values_are_html_escaped() {
        let registry = TemplateRegistry::embedded().unwrap();
        let out = registry
            .render("user_welcome.tmpl", json!({"userID": "<script>"}))
            .unwrap();
        assert!(out.html_body.contains("&lt;script&gt;"));
        assert!(!out.html_body.contains("<script>"));
    }

    #[test]
    fn unknown_template() {
        let registry = TemplateRegistry::embedded().unwrap();
        let err = registry.render("missing.tmpl", json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(name) if name == "missing.tmpl"));
        assert!(!registry.contains("missing.tmpl"));
        assert!(registry.contains("user_welcome.tmpl"));
    }

    #[test]
    fn missing_block_is_reported_by_name() {
        let registry = TemplateRegistry::from_sources([(
            "partial.tmpl",
            "{% block subject %}Hi{% endblock %}{% block plainBody %}Body{% endblock %}",
        )])
        .unwrap();

        let err = registry.render("partial.tmpl", json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::MissingBlock { block: "htmlBody", .. }));
    }

    #[test]
    fn missing_data_fails_rendering() {
        let registry = TemplateRegistry::embedded().unwrap();
        let err = registry.render("user_welcome.tmpl", json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::Render { .. }));
    }

    #[test]
    fn syntax_errors_surface_at_load_time() {
        let err = TemplateRegistry::from_sources([("broken.tmpl", "{% block subject %}")]).unwrap_err();
        assert!(matches!(err, TemplateError::Compile { template, .. } if template == "broken.tmpl"));
    }
}
