use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const API_URL_ENV: &str = "DEX_API_URL";
pub const DEBOUNCE_MS_ENV: &str = "DEX_DEBOUNCE_MS";
pub const STALE_RESPONSES_ENV: &str = "DEX_STALE_RESPONSES";
pub const LOG_FILTER_ENV: &str = "DEX_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub index_limit: u32,
    pub debounce_ms: u64,
    pub initial_input: String,
    pub key_min: u32,
    pub key_max: u32,
    pub request_timeout_secs: u64,
    pub stale_responses: StaleResponses,
    pub theme: Theme,
    pub log_filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    TerminalDark,
    TerminalLight,
}

/// What to do with a detail response whose request has since been superseded
/// by a newer lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponses {
    /// Apply every response as it arrives; a slow older response can
    /// overwrite a newer one.
    Apply,
    /// Drop responses that do not belong to the most recently issued fetch.
    Discard,
}

impl StaleResponses {
    pub fn label(self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::Discard => "discard",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "apply" => Some(Self::Apply),
            "discard" => Some(Self::Discard),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value {value:?} for {name}")]
    InvalidOverride { name: &'static str, value: String },
    #[error("invalid settings: {0}")]
    Invalid(String),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://pokeapi.co/api/v2".to_string(),
            index_limit: 1025,
            debounce_ms: 300,
            initial_input: "1".to_string(),
            key_min: 1,
            key_max: 1025,
            request_timeout_secs: 30,
            stale_responses: StaleResponses::Discard,
            theme: Theme::TerminalDark,
            log_filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Reads settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_env_overrides_from(|name| env::var(name).ok())
    }

    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api_base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(value) = lookup(DEBOUNCE_MS_ENV) {
            self.debounce_ms =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride {
                        name: DEBOUNCE_MS_ENV,
                        value: value.clone(),
                    })?;
        }

        if let Some(value) = lookup(STALE_RESPONSES_ENV) {
            self.stale_responses =
                StaleResponses::parse(&value).ok_or_else(|| ConfigError::InvalidOverride {
                    name: STALE_RESPONSES_ENV,
                    value: value.clone(),
                })?;
        }

        if let Some(filter) = lookup(LOG_FILTER_ENV) {
            self.log_filter = filter;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base_url is empty".to_string()));
        }
        if self.key_min == 0 {
            return Err(ConfigError::Invalid("key_min must be at least 1".to_string()));
        }
        if self.key_min > self.key_max {
            return Err(ConfigError::Invalid(format!(
                "key_min {} is greater than key_max {}",
                self.key_min, self.key_max
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn default_config_path() -> PathBuf {
    let base = env::var("LOCALAPPDATA")
        .or_else(|_| env::var("XDG_CONFIG_HOME"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(base).join("DexMini").join("settings.json")
}
