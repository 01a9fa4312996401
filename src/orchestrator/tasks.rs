use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Declared intent of a generation task, used for routing.
///
/// Unrecognized intents deliberately classify as `Bulk`: a degraded but
/// available answer beats blocking the whole batch on a typo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskIntent {
    Creative,
    Analytical,
    Bulk,
    Personalization,
}

impl TaskIntent {
    /// Parse an intent name, falling back to `Bulk` for anything unknown.
    pub fn parse_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "creative" => TaskIntent::Creative,
            "analytical" => TaskIntent::Analytical,
            "bulk" => TaskIntent::Bulk,
            "personalization" => TaskIntent::Personalization,
            _ => TaskIntent::Bulk,
        }
    }
}

impl fmt::Display for TaskIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskIntent::Creative => write!(f, "creative"),
            TaskIntent::Analytical => write!(f, "analytical"),
            TaskIntent::Bulk => write!(f, "bulk"),
            TaskIntent::Personalization => write!(f, "personalization"),
        }
    }
}

/// Sampling parameters forwarded to the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// One unit of generation work submitted by a caller.
///
/// Read-only to the orchestrator; everything the pipeline produces about
/// it is recorded in attempts and the final result, never written back
/// here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationTask {
    pub id: String,
    pub prompt: String,
    pub intent: TaskIntent,
    #[serde(default)]
    pub params: GenerationParams,
    /// Higher runs earlier within a batch. Ties keep submission order.
    #[serde(default)]
    pub priority: u8,
}

impl GenerationTask {
    /// Creates a bulk-intent task with default parameters.
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            intent: TaskIntent::Bulk,
            params: GenerationParams::default(),
            priority: 0,
        }
    }

    /// Sets the declared intent for this task.
    pub fn intent(mut self, intent: TaskIntent) -> Self {
        self.intent = intent;
        self
    }

    /// Sets max tokens for this task.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.params.max_tokens = Some(tokens);
        self
    }

    /// Sets the sampling temperature for this task.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.params.temperature = Some(temp);
        self
    }

    /// Sets the scheduling priority for this task.
    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Serialized form used in debug logging.
    pub fn summary(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "intent": self.intent.to_string(),
            "prompt_chars": self.prompt.len(),
            "priority": self.priority,
        })
    }
}
