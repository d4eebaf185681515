//! Model backend abstraction and the Gemini implementation.
//!
//! The synthesizer only needs one operation — [`complete`](ModelBackend::complete) —
//! but the error split matters: [`BackendError::RateLimited`] (quota, HTTP
//! 429) gets an actionable user-facing message upstream, while everything
//! else is uniform [`BackendError::Unavailable`].
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! Retries are bounded by `backend.max_retries`; a 429 that survives every
//! retry surfaces as `RateLimited`.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use thiserror::Error;

use crate::config::BackendConfig;

/// A model-backend call failure.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Quota exhaustion (HTTP 429). Recovered per section; surfaced to the
    /// user with quota guidance rather than generic error text.
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Any other failure: server errors, network errors, bad requests.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// A text-completion backend.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Model identifier, for progress output.
    fn model_name(&self) -> &str;

    /// One blocking prompt → text round trip.
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Backend calling the Google Gemini `generateContent` API.
///
/// Requires the `GEMINI_API_KEY` environment variable.
pub struct GeminiBackend {
    model: String,
    max_retries: u32,
    timeout_secs: u64,
}

impl GeminiBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        if std::env::var("GEMINI_API_KEY").is_err() {
            bail!("GEMINI_API_KEY environment variable not set");
        }
        Ok(Self {
            model: config.model.clone(),
            max_retries: config.max_retries,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| BackendError::Unavailable("GEMINI_API_KEY not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let mut last_err = BackendError::Unavailable("no attempts made".to_string());

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = client
                .post(&url)
                .header("x-goog-api-key", &api_key)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let json: serde_json::Value = response
                            .json()
                            .await
                            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
                        return parse_gemini_response(&json);
                    }
                    let body_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 {
                        last_err = BackendError::RateLimited(format!("{}: {}", status, body_text));
                        continue;
                    }
                    if status.is_server_error() {
                        last_err = BackendError::Unavailable(format!("{}: {}", status, body_text));
                        continue;
                    }
                    // Client error (not 429) — don't retry.
                    return Err(BackendError::Unavailable(format!("{}: {}", status, body_text)));
                }
                Err(e) => {
                    last_err = BackendError::Unavailable(e.to_string());
                    continue;
                }
            }
        }

        Err(last_err)
    }
}

/// Extract the candidate text from a `generateContent` response.
///
/// Concatenates all parts of the first candidate.
fn parse_gemini_response(json: &serde_json::Value) -> Result<String, BackendError> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            BackendError::Unavailable("invalid Gemini response: missing candidates".to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(BackendError::Unavailable(
            "Gemini response contained no text".to_string(),
        ));
    }
    Ok(text)
}

/// Create the configured [`ModelBackend`].
pub fn create_backend(config: &BackendConfig) -> Result<Box<dyn ModelBackend>> {
    match config.provider.as_str() {
        "gemini" => Ok(Box::new(GeminiBackend::new(config)?)),
        other => bail!("Unknown model backend: {}", other),
    }
}
