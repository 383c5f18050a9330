//! Blocking client for the external text-generation service.
//!
//! The service is called with exactly one user-role message and its free-form
//! reply is returned verbatim. Two wire dialects are supported: Ollama's
//! `/api/chat` and the OpenAI-compatible `/chat/completions` (which also
//! fronts Gemini, LM Studio, vLLM and friends).

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the LLM subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("LLM request failed: {message}")]
    #[diagnostic(
        code(ledger::llm::request_failed),
        help("Check that the service at `llm.base_url` is reachable and the model exists.")
    )]
    RequestFailed { message: String },

    #[error("LLM service returned status {status}: {message}")]
    #[diagnostic(
        code(ledger::llm::status),
        help("Authentication or quota problems usually show up as 401, 403 or 429.")
    )]
    Status { status: u16, message: String },

    #[error("failed to parse LLM response: {message}")]
    #[diagnostic(
        code(ledger::llm::parse_error),
        help("The service returned an unexpected response format. Check `llm.provider`.")
    )]
    ParseError { message: String },

    #[error("API key variable {var} is not set")]
    #[diagnostic(
        code(ledger::llm::missing_key),
        help("Export the API key in {var}, or point `llm.api_key_env` at the right variable.")
    )]
    MissingApiKey { var: String },
}

/// Wire dialect of the text-generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Ollama,
    /// Any OpenAI-compatible chat completions endpoint.
    Openai,
}

/// Configuration for the LLM client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    /// Base URL; for `openai` this includes the version prefix (e.g. `/v1`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the bearer key (`openai` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "llama3.2".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Anything that turns a prompt into text.
pub trait TextGenerator {
    /// Send `prompt` as a single user message and return the reply text.
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// HTTP client for the configured service.
pub struct ChatClient {
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    /// Get the model name being used.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match self.config.provider {
            LlmProvider::Ollama => format!("{base}/api/chat"),
            LlmProvider::Openai => format!("{base}/chat/completions"),
        }
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        let messages = serde_json::json!([{ "role": "user", "content": prompt }]);
        match self.config.provider {
            LlmProvider::Ollama => serde_json::json!({
                "model": self.config.model,
                "messages": messages,
                "stream": false,
            }),
            LlmProvider::Openai => serde_json::json!({
                "model": self.config.model,
                "messages": messages,
            }),
        }
    }

    fn api_key(&self) -> Result<Option<String>, LlmError> {
        match (&self.config.provider, &self.config.api_key_env) {
            (LlmProvider::Openai, Some(var)) => std::env::var(var)
                .map(Some)
                .map_err(|_| LlmError::MissingApiKey { var: var.clone() }),
            _ => Ok(None),
        }
    }
}

impl TextGenerator for ChatClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = self.endpoint();
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build();

        let body_str =
            serde_json::to_string(&self.request_body(prompt)).map_err(|e| LlmError::RequestFailed {
                message: format!("JSON serialize error: {e}"),
            })?;

        let mut request = agent.post(&url).set("Content-Type", "application/json");
        if let Some(key) = self.api_key()? {
            request = request.set("Authorization", &format!("Bearer {key}"));
        }

        tracing::info!(model = %self.config.model, url = %url, prompt_len = prompt.len(), "requesting completion");
        let resp = request.send_string(&body_str).map_err(|e| match e {
            ureq::Error::Status(status, resp) => LlmError::Status {
                status,
                message: resp.into_string().unwrap_or_default(),
            },
            other => LlmError::RequestFailed {
                message: other.to_string(),
            },
        })?;

        let resp_str = resp.into_string().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;
        extract_content(self.config.provider, &resp_str)
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("provider", &self.config.provider)
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

/// Pull the reply text out of a provider response body.
fn extract_content(provider: LlmProvider, body: &str) -> Result<String, LlmError> {
    let json: serde_json::Value = serde_json::from_str(body).map_err(|e| LlmError::ParseError {
        message: e.to_string(),
    })?;

    let content = match provider {
        LlmProvider::Ollama => &json["message"]["content"],
        LlmProvider::Openai => &json["choices"][0]["message"]["content"],
    };
    content
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| LlmError::ParseError {
            message: "missing message content".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_against_unreachable_port_fails() {
        let client = ChatClient::new(LlmConfig {
            base_url: "http://127.0.0.1:1".into(), // unreachable port
            timeout_secs: 2,
            ..Default::default()
        });
        let err = client.generate("hello").unwrap_err();
        assert!(matches!(err, LlmError::RequestFailed { .. }));
    }

    #[test]
    fn request_has_single_user_message() {
        for provider in [LlmProvider::Ollama, LlmProvider::Openai] {
            let client = ChatClient::new(LlmConfig {
                provider,
                ..Default::default()
            });
            let body = client.request_body("recommend me");
            let messages = body["messages"].as_array().unwrap();
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0]["role"], "user");
            assert_eq!(messages[0]["content"], "recommend me");
            assert_eq!(body["model"], "llama3.2");
        }
    }

    #[test]
    fn endpoints_per_provider() {
        let ollama = ChatClient::new(LlmConfig {
            base_url: "http://localhost:11434/".into(),
            ..Default::default()
        });
        assert_eq!(ollama.endpoint(), "http://localhost:11434/api/chat");

        let openai = ChatClient::new(LlmConfig {
            provider: LlmProvider::Openai,
            base_url: "https://api.example.com/v1".into(),
            ..Default::default()
        });
        assert_eq!(openai.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn extracts_content_from_both_dialects() {
        let ollama = r#"{"message": {"role": "assistant", "content": "Read Dune."}, "done": true}"#;
        assert_eq!(extract_content(LlmProvider::Ollama, ollama).unwrap(), "Read Dune.");

        let openai = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "Read Hyperion."}}]}"#;
        assert_eq!(extract_content(LlmProvider::Openai, openai).unwrap(), "Read Hyperion.");

        assert!(matches!(
            extract_content(LlmProvider::Openai, ollama),
            Err(LlmError::ParseError { .. })
        ));
        assert!(matches!(
            extract_content(LlmProvider::Ollama, "not json"),
            Err(LlmError::ParseError { .. })
        ));
    }

    #[test]
    fn missing_api_key_is_reported() {
        let client = ChatClient::new(LlmConfig {
            provider: LlmProvider::Openai,
            api_key_env: Some("BOOK_LEDGER_TEST_KEY_THAT_IS_NOT_SET".into()),
            ..Default::default()
        });
        assert!(matches!(client.api_key(), Err(LlmError::MissingApiKey { .. })));
    }

    #[test]
    fn default_config_values() {
        let config = LlmConfig::default();
        assert_eq!(config.provider, LlmProvider::Ollama);
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.timeout_secs, 120);
    }
}
