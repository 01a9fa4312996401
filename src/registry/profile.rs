use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants;
use crate::errors::{OrchestratorError, OrchestratorResult};

/// Provider hosting a model deployment.
///
/// All listed providers speak the OpenAI-style chat-completion wire
/// format; they differ only in endpoint shape and auth header, both of
/// which live on the [`ModelProfile`] as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    AzureOpenAi,
    OpenAi,
    GitHubModels,
    Groq,
}

impl ProviderKind {
    /// Parse a provider name as written in configuration files.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "azure" | "azure_openai" | "azureopenai" => Some(ProviderKind::AzureOpenAi),
            "openai" => Some(ProviderKind::OpenAi),
            "github" | "github_models" | "githubmodels" => Some(ProviderKind::GitHubModels),
            "groq" => Some(ProviderKind::Groq),
            _ => None,
        }
    }

    /// Default endpoint template for this provider, when it has a fixed host.
    ///
    /// Azure endpoints are resource-scoped, so there is no sensible
    /// default; the profile must supply one.
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            ProviderKind::AzureOpenAi => None,
            ProviderKind::OpenAi => Some("https://api.openai.com/v1/chat/completions"),
            ProviderKind::GitHubModels => {
                Some("https://models.inference.ai.azure.com/chat/completions")
            }
            ProviderKind::Groq => Some("https://api.groq.com/openai/v1/chat/completions"),
        }
    }

    /// Auth scheme this provider expects by default.
    pub fn default_auth(&self) -> AuthScheme {
        match self {
            ProviderKind::AzureOpenAi => AuthScheme::ApiKeyHeader,
            _ => AuthScheme::Bearer,
        }
    }

    /// Whether this provider requires an `api-version` query parameter.
    pub fn default_api_version(&self) -> Option<&'static str> {
        match self {
            ProviderKind::AzureOpenAi => Some(constants::AZURE_OPENAI_API_VERSION),
            _ => None,
        }
    }
}

impl From<&str> for ProviderKind {
    fn from(s: &str) -> Self {
        ProviderKind::parse(s).unwrap_or_else(|| panic!("Unknown provider: {}", s))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::AzureOpenAi => write!(f, "AzureOpenAI"),
            ProviderKind::OpenAi => write!(f, "OpenAI"),
            ProviderKind::GitHubModels => write!(f, "GitHubModels"),
            ProviderKind::Groq => write!(f, "Groq"),
        }
    }
}

/// Classification of a profile's intended use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTag {
    Creative,
    Analytical,
    Bulk,
}

impl RoleTag {
    /// Parse a role name as written in configuration files.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "creative" => Some(RoleTag::Creative),
            "analytical" => Some(RoleTag::Analytical),
            "bulk" => Some(RoleTag::Bulk),
            _ => None,
        }
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleTag::Creative => write!(f, "creative"),
            RoleTag::Analytical => write!(f, "analytical"),
            RoleTag::Bulk => write!(f, "bulk"),
        }
    }
}

/// How the API key is attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `api-key: <key>` (Azure OpenAI style)
    ApiKeyHeader,
}

/// A named, immutable description of one callable AI deployment.
///
/// Everything the executor needs to call the deployment is carried here
/// as data: endpoint template, auth scheme, api version, timeout. The
/// registry owns profiles; nothing mutates them after load.
#[derive(Debug, Clone)]
pub struct ModelProfile {
    pub id: String,
    pub provider: ProviderKind,
    /// Deployment or model name, substituted into the endpoint template.
    pub deployment: String,
    /// URL template. May contain a `{deployment}` placeholder.
    pub endpoint_template: String,
    /// Optional `api-version` query parameter value.
    pub api_version: Option<String>,
    pub auth: AuthScheme,
    /// Resolved API key, supplied by the caller's secret loading.
    pub api_key: String,
    pub role: RoleTag,
    /// Relative cost weight, used for fallback ordering and the
    /// cost-avoidance estimate. Higher means more expensive.
    pub cost_weight: f32,
    /// Per-request timeout for this deployment.
    pub timeout: Duration,
}

impl ModelProfile {
    /// Create a profile with provider defaults for endpoint, auth and
    /// api version.
    ///
    /// # Parameters
    /// * `id` - Unique identifier within the registry
    /// * `provider` - Hosting provider
    /// * `deployment` - Deployment or model name
    /// * `api_key` - Resolved credential for this deployment
    pub fn new(
        id: impl Into<String>,
        provider: ProviderKind,
        deployment: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            provider,
            deployment: deployment.into(),
            endpoint_template: provider.default_endpoint().unwrap_or_default().to_string(),
            api_version: provider.default_api_version().map(str::to_string),
            auth: provider.default_auth(),
            api_key: api_key.into(),
            role: RoleTag::Bulk,
            cost_weight: 1.0,
            timeout: Duration::from_secs(constants::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Sets the role tag for this profile.
    pub fn role(mut self, role: RoleTag) -> Self {
        self.role = role;
        self
    }

    /// Sets the relative cost weight for this profile.
    pub fn cost_weight(mut self, weight: f32) -> Self {
        self.cost_weight = weight;
        self
    }

    /// Sets the per-request timeout for this profile.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the endpoint template (required for Azure profiles).
    pub fn endpoint(mut self, template: impl Into<String>) -> Self {
        self.endpoint_template = template.into();
        self
    }

    /// Overrides the `api-version` query parameter.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Build the concrete request URL for this profile.
    ///
    /// This is the single place endpoint construction happens: the
    /// `{deployment}` placeholder is substituted and the api version is
    /// appended as a query parameter when the profile carries one.
    pub fn build_url(&self) -> OrchestratorResult<Url> {
        if self.endpoint_template.is_empty() {
            return Err(OrchestratorError::EndpointError(format!(
                "Profile '{}' ({}) has no endpoint template",
                self.id, self.provider
            )));
        }

        let resolved = self.endpoint_template.replace("{deployment}", &self.deployment);
        let mut url = Url::parse(&resolved)?;

        if let Some(ref version) = self.api_version {
            url.query_pairs_mut().append_pair("api-version", version);
        }

        Ok(url)
    }
}
