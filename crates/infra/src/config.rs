//! Configuration loading and representation.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Operating environment of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl core::str::FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

impl core::fmt::Display for Environment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SMTP submission settings.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// `From` mailbox, e.g. `Bedrock <no-reply@example.com>`.
    pub sender: String,
    pub timeout: Duration,
}

impl core::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub env: Environment,
    pub smtp: SmtpConfig,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 4000;
    pub const SMTP_TIMEOUT: Duration = Duration::from_secs(5);

    /// Load from the environment after applying a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "failed to read .env file");
            }
        }
        Self::from_vars(&std::env::vars().collect())
    }

    /// Build from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &'static str| vars.get(name).map(String::as_str).filter(|v| !v.is_empty());
        let require = |name: &'static str| get(name).map(str::to_owned).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(raw) => parse_port("PORT", raw)?,
            None => Self::DEFAULT_PORT,
        };

        let env = match get("APP_ENV") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "APP_ENV",
                value: raw.to_string(),
            })?,
            None => Environment::default(),
        };

        let smtp = SmtpConfig {
            host: require("SMTP_HOST")?,
            port: parse_port("SMTP_PORT", &require("SMTP_PORT")?)?,
            username: require("SMTP_USERNAME")?,
            password: require("SMTP_PASSWORD")?,
            sender: require("SMTP_SENDER")?,
            timeout: Self::SMTP_TIMEOUT,
        };

        Ok(Self { port, env, smtp })
    }
}

fn parse_port(name: &'static str, raw: &str) -> Result<u16, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
