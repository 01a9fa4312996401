//! Configuration types for TOML-based configuration.
//!
//! These types map directly to the TOML configuration file structure.

use serde::Deserialize;

use crate::constants;

/// Root configuration structure.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Global orchestrator settings.
    #[serde(default)]
    pub settings: Settings,

    /// Model profile entries, in preference order.
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
}

/// Global orchestrator settings.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Default worker pool size for batches.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Maximum attempts per profile before escalating.
    #[serde(default = "default_retries")]
    pub retries_per_profile: usize,

    /// Exponential backoff base delay, milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Exponential backoff cap, milliseconds.
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            retries_per_profile: default_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
        }
    }
}

fn default_pool_size() -> usize {
    constants::DEFAULT_POOL_SIZE
}

fn default_retries() -> usize {
    constants::DEFAULT_RETRIES_PER_PROFILE
}

fn default_backoff_base_ms() -> u64 {
    constants::DEFAULT_BACKOFF_BASE_MS
}

fn default_backoff_cap_ms() -> u64 {
    constants::DEFAULT_BACKOFF_CAP_MS
}

/// One model profile entry.
#[derive(Debug, Deserialize)]
pub struct ProfileConfig {
    /// Unique identifier within the registry.
    pub id: String,

    /// Provider name: "azure", "openai", "github", "groq".
    pub provider: String,

    /// Deployment or model name.
    pub deployment: String,

    /// Endpoint template override. Required for Azure profiles; may
    /// contain a `{deployment}` placeholder.
    pub endpoint: Option<String>,

    /// `api-version` query parameter override.
    pub api_version: Option<String>,

    /// Role tag: "creative", "analytical", "bulk".
    #[serde(default = "default_role")]
    pub role: String,

    /// Relative cost weight (per 1K tokens). Higher is more expensive.
    #[serde(default = "default_cost_weight")]
    pub cost_weight: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// API key (supports environment variable syntax: "${VAR_NAME}").
    #[serde(default)]
    pub api_key: String,
}

fn default_role() -> String {
    "bulk".to_string()
}

fn default_cost_weight() -> f32 {
    1.0
}

fn default_timeout_secs() -> u64 {
    constants::DEFAULT_REQUEST_TIMEOUT_SECS
}
