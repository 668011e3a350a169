//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the chat service, the PullRequestService backend, dispatching and logging,
//! plus the startup validation that turns them into immutable runtime settings.

use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
    pub pr_service: PrServiceConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_env: Option<String>, // e.g. "MATRIX_PASSWORD"
    /// Room the bot listens on and replies to
    pub room: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PrServiceConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// XML payload sent along with the start request
    pub config_file: PathBuf,
    #[serde(default = "default_http_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct BotConfig {
    /// Name the bot answers to. Falls back to the Matrix username.
    #[serde(default)]
    pub mention: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    #[serde(default = "default_dispatch_timeout")]
    pub timeout: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub max_in_flight: Option<usize>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: default_dispatch_timeout(),
            queue_capacity: default_queue_capacity(),
            max_in_flight: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_file")]
    pub file: String,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

fn default_api_key_env() -> String {
    "PRS_API_KEY".to_string()
}
fn default_http_timeout() -> u64 {
    5
}
fn default_dispatch_timeout() -> u64 {
    30
}
fn default_queue_capacity() -> usize {
    64
}
fn default_log_directory() -> String {
    "data".to_string()
}
fn default_log_file() -> String {
    "session.log".to_string()
}
fn default_log_filter() -> String {
    "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn"
        .to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("services.matrix.{0} is required")]
    MissingMatrixField(&'static str),
    #[error("no Matrix password: set services.matrix.password or the variable named by password_env")]
    MissingPassword,
    #[error("no PullRequestService API key: set services.pr_service.api_key or ${0}")]
    MissingApiKey(String),
    #[error("services.pr_service.url is not a valid URL '{0}': {1}")]
    InvalidUrl(String, String),
    #[error("could not read PullRequestService config file {0}: {1}")]
    PayloadUnreadable(String, std::io::Error),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Read-only settings for the PullRequestService client, resolved once at startup.
#[derive(Debug, Clone)]
pub struct PrServiceSettings {
    pub url: Url,
    pub api_key: String,
    pub payload: Vec<u8>,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).context(crate::strings::logs::CONFIG_PARSE_ERROR)
    }

    /// Checks everything that does not need the environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let matrix = &self.services.matrix;
        for (name, value) in [
            ("homeserver", &matrix.homeserver),
            ("username", &matrix.username),
            ("room", &matrix.room),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingMatrixField(name));
            }
        }
        if self.services.pr_service.timeout == 0 {
            return Err(ConfigError::Zero("services.pr_service.timeout"));
        }
        if self.dispatch.timeout == 0 {
            return Err(ConfigError::Zero("dispatch.timeout"));
        }
        if self.dispatch.queue_capacity == 0 {
            return Err(ConfigError::Zero("dispatch.queue_capacity"));
        }
        if self.dispatch.max_in_flight == Some(0) {
            return Err(ConfigError::Zero("dispatch.max_in_flight"));
        }
        Ok(())
    }

    /// Name the bot answers to, without the leading `@` and lower-cased.
    pub fn mention(&self) -> String {
        let name = self.bot.mention.clone().unwrap_or_else(|| {
            // "@bot:server" -> "bot"
            let user = self.services.matrix.username.trim_start_matches('@');
            user.split(':').next().unwrap_or(user).to_string()
        });
        name.trim_start_matches('@').to_lowercase()
    }

    pub fn matrix_password(&self) -> Result<String, ConfigError> {
        let matrix = &self.services.matrix;
        matrix
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(|| {
                matrix
                    .password_env
                    .as_ref()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|p| !p.is_empty())
            })
            .ok_or(ConfigError::MissingPassword)
    }

    pub fn pr_service_settings(&self) -> Result<PrServiceSettings, ConfigError> {
        let prs = &self.services.pr_service;
        let api_key = prs
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&prs.api_key_env).ok().filter(|k| !k.is_empty()))
            .ok_or_else(|| ConfigError::MissingApiKey(prs.api_key_env.clone()))?;
        let url = Url::parse(&prs.url)
            .map_err(|e| ConfigError::InvalidUrl(prs.url.clone(), e.to_string()))?;
        let payload = std::fs::read(&prs.config_file).map_err(|e| {
            ConfigError::PayloadUnreadable(prs.config_file.display().to_string(), e)
        })?;

        Ok(PrServiceSettings {
            url,
            api_key,
            payload,
            timeout: Duration::from_secs(prs.timeout),
        })
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch.timeout)
    }
}
