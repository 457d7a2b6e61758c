//! LLM client: Ollama generate API with a no-backend fallback mode.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse, OllamaGenerateReply};

/// Provider backend for LLM inference.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Ollama running locally.
    Ollama {
        /// Base URL, e.g. `http://localhost:11434`.
        base_url: String,
    },
    /// No LLM available; all calls return error, triggering rule-based fallback.
    None,
}

impl LlmProvider {
    /// Build a provider from its config name.
    ///
    /// # Errors
    /// Returns `LlmError::ConfigError` for an unknown provider name.
    pub fn from_name(name: &str, base_url: &str) -> Result<Self, LlmError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama {
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
            "none" | "off" => Ok(Self::None),
            other => Err(LlmError::ConfigError(format!("unknown provider '{other}'"))),
        }
    }
}

/// The LLM client. One request per call, no retries: a failed call is the
/// caller's cue to fall back.
#[derive(Debug, Clone)]
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
}

impl LlmClient {
    /// Create a new LLM client.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
        }
    }

    /// Create a client with no LLM backend (all calls fail → rule-based fallback).
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new())
    }

    /// Default model for requests that do not name one.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a response from the LLM.
    ///
    /// # Errors
    /// Returns `Err` if the LLM is unavailable, answers with a non-success
    /// status, times out or sends a malformed body. The caller should fall
    /// back to rule-based generation on error.
    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("No LLM provider configured".into())),
            LlmProvider::Ollama { base_url } => self.generate_ollama(base_url, request).await,
        }
    }

    /// Generate using Ollama's API.
    async fn generate_ollama(&self, base_url: &str, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        if model.is_empty() {
            return Err(LlmError::ConfigError("no model configured".into()));
        }

        let url = format!("{base_url}/api/generate");
        let mut body = json!({
            "model": model,
            "prompt": request.prompt,
            "system": request.system,
            "stream": false,
            "options": {
                "temperature": request.temperature,
            }
        });
        if request.json_mode {
            body["format"] = json!("json");
        }

        let start = Instant::now();
        let result = self
            .http
            .post(&url)
            .json(&body)
            .timeout(Duration::from_millis(request.timeout_ms))
            .send()
            .await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                warn!("Ollama request timed out after {}ms", request.timeout_ms);
                return Err(LlmError::Timeout(request.timeout_ms));
            }
            Err(e) => {
                warn!("Ollama request failed: {e}");
                return Err(e.into());
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Ollama returned error: HTTP {status}");
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let reply: OllamaGenerateReply = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(request.timeout_ms)
            } else {
                LlmError::ParseError(e.to_string())
            }
        })?;

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(model, latency_ms, tokens = reply.eval_count.unwrap_or(0), "Ollama call complete");

        Ok(LlmResponse {
            text: reply.response,
            tokens_generated: reply.eval_count.unwrap_or(0),
            latency_ms,
            model: reply.model.unwrap_or_else(|| model.to_string()),
        })
    }

    /// Check if the LLM client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_parse() {
        assert!(matches!(
            LlmProvider::from_name("Ollama", "http://localhost:11434/"),
            Ok(LlmProvider::Ollama { base_url }) if base_url == "http://localhost:11434"
        ));
        assert!(matches!(LlmProvider::from_name("none", ""), Ok(LlmProvider::None)));
        assert!(LlmProvider::from_name("openai", "").is_err());
    }

    #[tokio::test]
    async fn none_provider_is_unavailable() {
        let client = LlmClient::none();
        assert!(!client.is_available());
        let err = client
            .generate(&LlmRequest::new("sys", "hi"))
            .await
            .expect_err("no backend");
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[tokio::test]
    async fn empty_model_is_a_config_error() {
        let client = LlmClient::new(
            LlmProvider::Ollama {
                base_url: "http://127.0.0.1:9".into(),
            },
            "",
        );
        let err = client
            .generate(&LlmRequest::new("sys", "hi"))
            .await
            .expect_err("no model");
        assert!(matches!(err, LlmError::ConfigError(_)));
    }
}
