use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Language;
use crate::pipeline::normalize::DEFAULT_NEGATION_WINDOW;

/// Application-level constants
pub const APP_NAME: &str = "Triage Engine";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_ADVISORY_TIMEOUT_SECS: u64 = 20;

pub const ENV_KB_PATH: &str = "TRIAGE_KB_PATH";
pub const ENV_LEXICON_PATH: &str = "TRIAGE_LEXICON_PATH";
pub const ENV_GUIDELINES_DIR: &str = "TRIAGE_GUIDELINES_DIR";
pub const ENV_LANGUAGE: &str = "TRIAGE_LANGUAGE";
pub const ENV_NEGATION_WINDOW: &str = "TRIAGE_NEGATION_WINDOW";
pub const ENV_OLLAMA_URL: &str = "TRIAGE_OLLAMA_URL";
pub const ENV_OLLAMA_MODEL: &str = "TRIAGE_OLLAMA_MODEL";
pub const ENV_ADVISORY_TIMEOUT_SECS: &str = "TRIAGE_ADVISORY_TIMEOUT_SECS";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "triage_engine=debug,warn"
    } else {
        "triage_engine=info,warn"
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration. `None` paths mean "use the bundled resource"
/// or "feature disabled".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub kb_path: Option<PathBuf>,
    pub lexicon_path: Option<PathBuf>,
    /// Markdown guideline directory; no retrieval when unset.
    pub guidelines_dir: Option<PathBuf>,
    /// Output language when neither a hint nor detection decides.
    pub default_language: Language,
    pub negation_window: usize,
    /// Ollama endpoint; no narrative annotation when unset.
    pub ollama_url: Option<String>,
    pub ollama_model: String,
    pub advisory_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kb_path: None,
            lexicon_path: None,
            guidelines_dir: None,
            default_language: Language::default(),
            negation_window: DEFAULT_NEGATION_WINDOW,
            ollama_url: None,
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            advisory_timeout_secs: DEFAULT_ADVISORY_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `TRIAGE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_KB_PATH) {
            config.kb_path = Some(PathBuf::from(path));
        }
        if let Some(path) = get(ENV_LEXICON_PATH) {
            config.lexicon_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = get(ENV_GUIDELINES_DIR) {
            config.guidelines_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = get(ENV_LANGUAGE) {
            config.default_language = value.parse().map_err(|e: crate::models::InvalidEnum| {
                ConfigError::Invalid {
                    var: ENV_LANGUAGE,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(value) = get(ENV_NEGATION_WINDOW) {
            config.negation_window = parse_number(ENV_NEGATION_WINDOW, &value)?;
        }
        if let Some(url) = get(ENV_OLLAMA_URL) {
            config.ollama_url = Some(url);
        }
        if let Some(model) = get(ENV_OLLAMA_MODEL) {
            config.ollama_model = model;
        }
        if let Some(value) = get(ENV_ADVISORY_TIMEOUT_SECS) {
            let secs: u64 = parse_number(ENV_ADVISORY_TIMEOUT_SECS, &value)?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: ENV_ADVISORY_TIMEOUT_SECS,
                    value,
                    reason: "must be at least 1".into(),
                });
            }
            config.advisory_timeout_secs = secs;
        }

        Ok(config)
    }

    /// Ollama URL to use, if annotation is enabled.
    pub fn annotator_url(&self) -> Option<&str> {
        self.ollama_url.as_deref()
    }
}

fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
