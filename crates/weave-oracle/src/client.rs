//! [`LlmClient`] – blocking OpenAI-compatible chat interface.
//!
//! Talks to any model server exposing the `/v1/chat/completions` endpoint,
//! such as [Ollama](https://ollama.com) (`http://localhost:11434`). All calls
//! are blocking and carry no built-in retry or timeout; the engine's
//! concurrency model is synchronous end to end, and any host embedding it in
//! a networked context wraps its own policy around these calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use weave_oracle::client::{ChatMessage, CompletionOptions, LlmClient, Role};
//!
//! let client = LlmClient::new("http://localhost:11434", "llama3");
//! let messages = vec![
//!     ChatMessage { role: Role::System, content: "You are a helpful assistant.".into() },
//!     ChatMessage { role: Role::User, content: "Summarize this note.".into() },
//! ];
//! // Requires a running model server – skipped in unit tests.
//! // let reply = client.complete(&messages, &CompletionOptions::conversational())?;
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use weave_types::OracleError;

// ─────────────────────────────────────────────────────────────────────────────
// Message types (OpenAI-compatible)
// ─────────────────────────────────────────────────────────────────────────────

/// The role of a participant in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Completion options
// ─────────────────────────────────────────────────────────────────────────────

/// Per-call sampling knobs and optional structured-output constraint.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Sampling temperature; low for extraction, higher for synthesis.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// When set, the schema is injected via `response_format` so the model
    /// is forced to emit JSON matching it.
    pub json_schema: Option<serde_json::Value>,
}

impl CompletionOptions {
    /// Cold, deterministic settings for attribute extraction.
    pub fn extraction(schema: serde_json::Value) -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 1000,
            json_schema: Some(schema),
        }
    }

    /// Slightly warmer settings for abstractive synthesis.
    pub fn synthesis(schema: serde_json::Value) -> Self {
        Self {
            temperature: 0.5,
            max_tokens: 1500,
            json_schema: Some(schema),
        }
    }

    /// Free-form settings for user-facing conversation.
    pub fn conversational() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 3000,
            json_schema: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal request / response shapes
// ─────────────────────────────────────────────────────────────────────────────

/// `response_format` field that enforces structured JSON Schema output.
#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: serde_json::Value,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

// ─────────────────────────────────────────────────────────────────────────────
// LlmClient
// ─────────────────────────────────────────────────────────────────────────────

/// A blocking client for an OpenAI-compatible chat-completions endpoint.
///
/// Construct once and reuse across turns.
pub struct LlmClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl LlmClient {
    /// Create a new client pointing at `base_url` (e.g.
    /// `"http://localhost:11434"`) and using `model` (e.g. `"llama3"`).
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Attach a bearer token for hosted OpenAI-compatible endpoints.
    /// Local Ollama needs none.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    /// The model name this client was configured with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `messages` to the model and return the assistant's reply text.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Transport`] when the HTTP call fails and
    /// [`OracleError::MalformedResponse`] when the response shape is not the
    /// expected chat-completion envelope.
    pub fn complete(
        &self,
        messages: &[ChatMessage],
        opts: &CompletionOptions,
    ) -> Result<String, OracleError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            temperature: opts.temperature,
            max_tokens: opts.max_tokens,
            response_format: opts.json_schema.clone().map(|schema| ResponseFormat {
                kind: "json_schema",
                json_schema: schema,
            }),
        };

        debug!(url = %url, model = %self.model, messages = messages.len(), "chat completion request");
        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response: ChatResponse = request
            .send()
            .map_err(|e| OracleError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| OracleError::Transport(e.to_string()))?
            .json()
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::MalformedResponse("empty choices array".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_serializes_role_lowercase() {
        let msg = ChatMessage {
            role: Role::System,
            content: "hello".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"system\""));
    }

    #[test]
    fn chat_message_roundtrip() {
        let msg = ChatMessage {
            role: Role::User,
            content: "remember this".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::User);
        assert_eq!(back.content, "remember this");
    }

    #[test]
    fn request_omits_response_format_when_unconstrained() {
        let messages = vec![ChatMessage {
            role: Role::User,
            content: "hi".into(),
        }];
        let opts = CompletionOptions::conversational();
        let body = ChatRequest {
            model: "llama3",
            messages: &messages,
            stream: false,
            temperature: opts.temperature,
            max_tokens: opts.max_tokens,
            response_format: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("response_format"));
    }

    #[test]
    fn request_carries_json_schema_when_constrained() {
        let messages = vec![ChatMessage {
            role: Role::User,
            content: "hi".into(),
        }];
        let body = ChatRequest {
            model: "llama3",
            messages: &messages,
            stream: false,
            temperature: 0.2,
            max_tokens: 1000,
            response_format: Some(ResponseFormat {
                kind: "json_schema",
                json_schema: serde_json::json!({"type": "object"}),
            }),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"json_schema\""));
        assert!(json.contains("\"type\":\"json_schema\""));
    }

    #[test]
    fn completion_presets_have_expected_temperatures() {
        assert_eq!(
            CompletionOptions::extraction(serde_json::Value::Null).temperature,
            0.2
        );
        assert_eq!(
            CompletionOptions::synthesis(serde_json::Value::Null).temperature,
            0.5
        );
        assert_eq!(CompletionOptions::conversational().temperature, 0.7);
    }

    #[test]
    fn client_constructed_without_panic() {
        let client = LlmClient::new("http://localhost:11434", "llama3");
        assert_eq!(client.model(), "llama3");
    }

    #[test]
    fn empty_api_key_is_treated_as_absent() {
        let client = LlmClient::new("http://localhost:11434", "llama3").with_api_key("");
        assert!(client.api_key.is_none());

        let client = LlmClient::new("http://localhost:11434", "llama3").with_api_key("sk-x");
        assert_eq!(client.api_key.as_deref(), Some("sk-x"));
    }
}
