//! External fallback service for formulas the deterministic path rejects.
//!
//! The service receives every step of one output field and answers with a
//! single complete script for that field.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default endpoint of the chat-completion service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/chat";

/// Default model requested from the service.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Default timeout for one fallback call: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One escalated field: its name and the raw source expressions, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackRequest {
    pub field_name: String,
    pub steps: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error("fallback service is disabled")]
    Disabled,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("service answered with HTTP status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Contract for anything that can turn a batch of formula steps into a script.
pub trait FallbackService: Send + Sync {
    fn convert(&self, request: &FallbackRequest) -> Result<String, FallbackError>;
}

/// A service that never answers. Used where no network is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledFallback;

impl FallbackService for DisabledFallback {
    fn convert(&self, _request: &FallbackRequest) -> Result<String, FallbackError> {
        Err(FallbackError::Disabled)
    }
}

/// Connection settings for [`ChatFallback`].
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    /// Chat endpoint URL.
    pub endpoint: String,
    /// Model name sent with every request.
    pub model: String,
    /// Upper bound on one call.
    pub timeout: Duration,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FallbackConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }
}

const SYSTEM_PROMPT: &str = r#"You translate sequential Alteryx formula steps for one column into a single KNIME Column Expressions script.
Rules:
1. Declare `var val`, seed it from the column being written when it exists, then apply every step in order to `val`.
2. Use isMissing(x) for IsNull(x) and regexMatcher(s, p) for REGEX_Match(s, p).
3. Do not use `return`; the last statement must be `val;`.
4. Escape backslashes twice inside string literals.
Answer with a JSON object {"script": "..."} and nothing else."#;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    format: &'static str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatReply {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}

#[derive(Deserialize)]
struct ScriptPayload {
    script: String,
}

fn user_message(request: &FallbackRequest) -> Result<String, FallbackError> {
    let steps = serde_json::to_string(&request.steps)
        .map_err(|e| FallbackError::Transport(e.to_string()))?;
    Ok(format!(
        "TARGET COLUMN: {}\nSTEPS: {}\nOUTPUT JSON: {{\"script\": \"...\"}}",
        request.field_name, steps
    ))
}

/// Pull the script out of a chat reply's message content.
fn extract_script(content: &str) -> Result<String, FallbackError> {
    let payload: ScriptPayload = serde_json::from_str(content)
        .map_err(|e| FallbackError::MalformedResponse(e.to_string()))?;
    if payload.script.trim().is_empty() {
        return Err(FallbackError::MalformedResponse("empty script".into()));
    }
    Ok(payload.script)
}

/// Blocking client for an Ollama-compatible chat endpoint.
#[cfg(not(target_arch = "wasm32"))]
pub struct ChatFallback {
    config: FallbackConfig,
    client: reqwest::blocking::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl ChatFallback {
    pub fn new(config: FallbackConfig) -> Result<Self, FallbackError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(format!("alternime/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FallbackError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    fn classify(&self, error: reqwest::Error) -> FallbackError {
        if error.is_timeout() {
            FallbackError::Timeout(self.config.effective_timeout())
        } else if error.is_decode() {
            FallbackError::MalformedResponse(error.to_string())
        } else {
            FallbackError::Transport(error.to_string())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FallbackService for ChatFallback {
    fn convert(&self, request: &FallbackRequest) -> Result<String, FallbackError> {
        let user = user_message(request)?;
        let body = ChatRequest {
            model: &self.config.model,
            format: "json",
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FallbackError::Status(status.as_u16()));
        }

        let reply: ChatReply = response.json().map_err(|e| self.classify(e))?;
        extract_script(&reply.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = FallbackConfig::default();
        assert_eq!(config.endpoint, "http://localhost:11434/api/chat");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn effective_timeout_uses_default_when_zero() {
        let config = FallbackConfig::default().with_timeout(Duration::ZERO);
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
        let config = config.with_timeout(Duration::from_secs(5));
        assert_eq!(config.effective_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn disabled_always_fails() {
        let request = FallbackRequest {
            field_name: "x".into(),
            steps: vec!["1".into()],
        };
        assert!(matches!(
            DisabledFallback.convert(&request),
            Err(FallbackError::Disabled)
        ));
    }

    #[test]
    fn user_message_lists_steps_as_json() {
        let request = FallbackRequest {
            field_name: "Total".into(),
            steps: vec!["[a] + 1".into(), "Foo(\"b\")".into()],
        };
        let msg = user_message(&request).unwrap();
        assert!(msg.contains("TARGET COLUMN: Total"));
        assert!(msg.contains(r#"STEPS: ["[a] + 1","Foo(\"b\")"]"#));
    }

    #[test]
    fn extract_script_accepts_script_field() {
        let script = extract_script(r#"{"script": "var val = 1;\nval;"}"#).unwrap();
        assert_eq!(script, "var val = 1;\nval;");
    }

    #[test]
    fn extract_script_rejects_other_shapes() {
        for content in ["not json", r#"{"code": "x"}"#, r#"{"script": "  "}"#] {
            assert!(matches!(
                extract_script(content),
                Err(FallbackError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn chat_request_body_shape() {
        let body = ChatRequest {
            model: "m",
            format: "json",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "s",
                },
                ChatMessage {
                    role: "user",
                    content: "u",
                },
            ],
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["options"]["temperature"], 0.0);
    }
}
