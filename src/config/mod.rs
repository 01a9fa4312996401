//! TOML-based configuration for the orchestrator.
//!
//! Lets deployments be managed declaratively instead of through the
//! builder. API keys and endpoints can reference environment variables
//! with the `${VAR_NAME}` syntax; references are resolved at load time.
//!
//! # Example Configuration File
//!
//! ```toml
//! [settings]
//! pool_size = 3
//! retries_per_profile = 3
//!
//! [[profiles]]
//! id = "tutor-creative"
//! provider = "azure"
//! deployment = "gpt-4o"
//! endpoint = "https://edu-east.openai.azure.com/openai/deployments/{deployment}/chat/completions"
//! role = "creative"
//! cost_weight = 10.0
//! api_key = "${AZURE_OPENAI_KEY}"
//!
//! [[profiles]]
//! id = "seed-bulk"
//! provider = "github"
//! deployment = "gpt-4o-mini"
//! role = "bulk"
//! cost_weight = 0.6
//! api_key = "${GITHUB_TOKEN}"
//! ```

mod loader;
mod types;

pub use loader::{build_profiles, load_config, parse_config};
pub use types::{Config, ProfileConfig, Settings};
