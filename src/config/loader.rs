//! Configuration file loading and environment variable resolution.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use regex::Regex;

use super::types::Config;
use crate::errors::{OrchestratorError, OrchestratorResult};
use crate::registry::profile::{ModelProfile, ProviderKind, RoleTag};

/// Load and parse a TOML configuration file.
///
/// # Arguments
/// * `path` - Path to the TOML configuration file
///
/// # Returns
/// * `OrchestratorResult<Config>` - Parsed configuration with environment variables resolved
pub fn load_config<P: AsRef<Path>>(path: P) -> OrchestratorResult<Config> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        OrchestratorError::ConfigError(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&content)
}

/// Parse a TOML configuration string.
pub fn parse_config(content: &str) -> OrchestratorResult<Config> {
    let mut config: Config = toml::from_str(content)
        .map_err(|e| OrchestratorError::ConfigError(format!("Failed to parse TOML: {}", e)))?;

    resolve_env_vars(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Turn validated profile entries into registry profiles.
pub fn build_profiles(config: &Config) -> OrchestratorResult<Vec<ModelProfile>> {
    let mut profiles = Vec::with_capacity(config.profiles.len());

    for entry in &config.profiles {
        // validate_config already checked these parse.
        let provider = ProviderKind::parse(&entry.provider).ok_or_else(|| {
            OrchestratorError::ConfigError(format!("Unknown provider '{}'", entry.provider))
        })?;
        let role = RoleTag::parse(&entry.role).ok_or_else(|| {
            OrchestratorError::ConfigError(format!("Unknown role '{}'", entry.role))
        })?;

        let mut profile =
            ModelProfile::new(&entry.id, provider, &entry.deployment, &entry.api_key)
                .role(role)
                .cost_weight(entry.cost_weight)
                .timeout(Duration::from_secs(entry.timeout_secs));
        if let Some(ref endpoint) = entry.endpoint {
            profile = profile.endpoint(endpoint);
        }
        if let Some(ref version) = entry.api_version {
            profile = profile.api_version(version);
        }

        profiles.push(profile);
    }

    Ok(profiles)
}

/// Resolve environment variable references in the configuration.
///
/// Environment variables are specified using the `${VAR_NAME}` syntax.
/// If a variable is not found, an error is returned with a helpful message.
fn resolve_env_vars(config: &mut Config) -> OrchestratorResult<()> {
    let env_var_pattern =
        Regex::new(r"\$\{([^}]+)\}").map_err(|e| OrchestratorError::ConfigError(e.to_string()))?;

    for (idx, profile) in config.profiles.iter_mut().enumerate() {
        profile.api_key = resolve_env_var_string(&profile.api_key, &env_var_pattern)
            .map_err(|var_name| {
                OrchestratorError::ConfigError(format!(
                    "Environment variable '{}' not found\n  \
                     → Referenced in profiles[{}].api_key\n  \
                     → Set it with: export {}=\"your-key\"",
                    var_name, idx, var_name
                ))
            })?;

        if let Some(ref endpoint) = profile.endpoint {
            profile.endpoint = Some(
                resolve_env_var_string(endpoint, &env_var_pattern).map_err(|var_name| {
                    OrchestratorError::ConfigError(format!(
                        "Environment variable '{}' not found\n  \
                         → Referenced in profiles[{}].endpoint\n  \
                         → Set it with: export {}=\"your-endpoint\"",
                        var_name, idx, var_name
                    ))
                })?,
            );
        }
    }

    Ok(())
}

/// Resolve environment variables in a single string.
/// Returns the resolved string, or the name of the first missing variable.
fn resolve_env_var_string(s: &str, pattern: &Regex) -> Result<String, String> {
    if !pattern.is_match(s) {
        return Ok(s.to_string());
    }

    let mut result = s.to_string();

    for caps in pattern.captures_iter(s) {
        let Some(full_match) = caps.get(0) else { continue };
        let Some(var_name) = caps.get(1) else { continue };

        match env::var(var_name.as_str()) {
            Ok(value) => {
                result = result.replace(full_match.as_str(), &value);
            }
            Err(_) => return Err(var_name.as_str().to_string()),
        }
    }

    Ok(result)
}

/// Validate the configuration beyond what serde enforces.
fn validate_config(config: &Config) -> OrchestratorResult<()> {
    if config.profiles.is_empty() {
        return Err(OrchestratorError::ConfigError(
            "Configuration defines no profiles".to_string(),
        ));
    }

    for (idx, profile) in config.profiles.iter().enumerate() {
        if profile.id.trim().is_empty() {
            return Err(OrchestratorError::ConfigError(format!(
                "profiles[{}] has an empty id",
                idx
            )));
        }

        let Some(provider) = ProviderKind::parse(&profile.provider) else {
            return Err(OrchestratorError::ConfigError(format!(
                "profiles[{}] ('{}'): unknown provider '{}'",
                idx, profile.id, profile.provider
            )));
        };

        if RoleTag::parse(&profile.role).is_none() {
            return Err(OrchestratorError::ConfigError(format!(
                "profiles[{}] ('{}'): unknown role '{}'",
                idx, profile.id, profile.role
            )));
        }

        // Azure endpoints are resource-scoped; there is no default.
        if provider == ProviderKind::AzureOpenAi && profile.endpoint.is_none() {
            return Err(OrchestratorError::ConfigError(format!(
                "profiles[{}] ('{}'): azure profiles require an explicit endpoint",
                idx, profile.id
            )));
        }

        if profile.cost_weight < 0.0 {
            return Err(OrchestratorError::ConfigError(format!(
                "profiles[{}] ('{}'): cost_weight must be non-negative",
                idx, profile.id
            )));
        }
    }

    Ok(())
}
