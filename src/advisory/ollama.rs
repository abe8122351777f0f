use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::Language;

use super::prompt::system_prompt_i18n;
use super::{AdvisoryError, NarrativeAnnotator};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Narrative annotator backed by a local Ollama instance.
pub struct OllamaAnnotator {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaAnnotator {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, AdvisoryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AdvisoryError::Connection(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl NarrativeAnnotator for OllamaAnnotator {
    fn annotate(&self, summary: &str, language: Language) -> Result<String, AdvisoryError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt: summary,
            system: system_prompt_i18n(language),
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_timeout() {
                AdvisoryError::Timeout(self.timeout_secs * 1000)
            } else if e.is_connect() {
                AdvisoryError::Connection(self.base_url.clone())
            } else {
                AdvisoryError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AdvisoryError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| AdvisoryError::Parse(e.to_string()))?;

        Ok(parsed.response.trim().to_string())
    }
}

#[derive(Debug, Clone)]
enum MockBehavior {
    Respond(String),
    Fail(String),
}

/// Annotator for tests: fixed response or failure, optional delay.
pub struct MockAnnotator {
    behavior: MockBehavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockAnnotator {
    pub fn new(response: &str) -> Self {
        Self {
            behavior: MockBehavior::Respond(response.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails with a connection error.
    pub fn failing(reason: &str) -> Self {
        Self {
            behavior: MockBehavior::Fail(reason.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NarrativeAnnotator for MockAnnotator {
    fn annotate(&self, _summary: &str, _language: Language) -> Result<String, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match &self.behavior {
            MockBehavior::Respond(text) => Ok(text.clone()),
            MockBehavior::Fail(reason) => Err(AdvisoryError::Connection(reason.clone())),
        }
    }
}
