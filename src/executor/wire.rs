use serde::{Deserialize, Serialize};

use crate::constants;
use crate::orchestrator::tasks::GenerationTask;

/// Role-tagged chat message.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body for an OpenAI-style chat-completion endpoint.
///
/// Every supported provider speaks this shape; endpoint and headers are
/// the only provider-specific parts, and those come from the profile.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Build the wire request for a task against a given deployment.
    pub fn from_task(deployment: &str, task: &GenerationTask) -> Self {
        Self {
            model: deployment.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: task.prompt.clone(),
            }],
            max_tokens: Some(task.params.max_tokens.unwrap_or(constants::DEFAULT_MAX_TOKENS)),
            temperature: task.params.temperature,
        }
    }
}

/// Response body from a chat-completion endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Individual choice from a chat-completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token accounting reported by the provider.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Sum two usage records, saturating on overflow.
    pub fn add(&self, other: &TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.saturating_add(other.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(other.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(other.total_tokens),
        }
    }
}
