//! Chat-completion request/response model for the problem solver.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StatError, StatResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.x.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "grok-4-latest";
pub const DEFAULT_PROXY_PATH: &str = "/api/grok";

const SYSTEM_PROMPT: &str = "You are a statistics tutor. Provide step-by-step solutions with clear \
explanations and formulas. Use LaTeX notation for mathematical expressions (wrap inline math in $ \
and block math in $$). Structure your response with clear sections: Solution, Explanation, and \
Final Answer.";

/// Placeholder shipped in sample env files; never a real key.
pub const PLACEHOLDER_KEY: &str = "your_api_key_here";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Build the tutoring request for a free-text problem.
pub fn build_request(problem: &str, model: &str) -> StatResult<ChatRequest> {
    let problem = problem.trim();
    if problem.is_empty() {
        return Err(StatError::validation("Please enter a problem to solve"));
    }
    Ok(ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::new("system", SYSTEM_PROMPT),
            ChatMessage::new(
                "user",
                format!("Solve this statistics problem step-by-step: {problem}"),
            ),
        ],
        temperature: 0.7,
        max_tokens: 2000,
    })
}

/// Pull `choices[0].message.content` out of a completion response.
pub fn extract_solution(response: &Value) -> StatResult<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StatError::Upstream("response has no choices[0].message.content".into()))
}

/// Where a solve request goes.
#[derive(Clone, PartialEq, Eq)]
pub enum SolverRoute {
    /// Through the gateway, which holds the credential.
    Proxied { url: String },
    /// Straight to the provider with a client-held key.
    Direct { endpoint: String, api_key: String },
}

impl std::fmt::Debug for SolverRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proxied { url } => f.debug_struct("Proxied").field("url", url).finish(),
            Self::Direct { endpoint, .. } => f
                .debug_struct("Direct")
                .field("endpoint", endpoint)
                .field("api_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Usable client-side key, ignoring blanks and the sample placeholder.
pub fn usable_key(candidate: Option<&str>) -> Option<&str> {
    candidate
        .map(str::trim)
        .filter(|k| !k.is_empty() && *k != PLACEHOLDER_KEY)
}

/// Message shown when a solve attempt fails.
pub fn failure_message(err: &StatError) -> String {
    match err {
        StatError::Validation(msg) => msg.clone(),
        other => format!(
            "Failed to solve problem: {other}. Please check your API key and try again."
        ),
    }
}
