use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header, Client};

use crate::errors::{FailureKind, OrchestratorResult};
use crate::executor::wire::{ChatRequest, ChatResponse, TokenUsage};
use crate::orchestrator::tasks::GenerationTask;
use crate::registry::profile::{AuthScheme, ModelProfile};

/// Outcome of a single generation call.
///
/// All failures are data. Nothing the backend encounters, transport
/// errors included, crosses this boundary as an `Err`.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Success {
        content: String,
        usage: TokenUsage,
        latency: Duration,
    },
    Failure {
        kind: FailureKind,
        detail: String,
        latency: Duration,
    },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            AttemptOutcome::Failure { kind, .. } => Some(*kind),
            AttemptOutcome::Success { .. } => None,
        }
    }

    pub fn latency(&self) -> Duration {
        match self {
            AttemptOutcome::Success { latency, .. } => *latency,
            AttemptOutcome::Failure { latency, .. } => *latency,
        }
    }
}

/// Seam between the retry controller and the provider network.
///
/// Implemented by [`HttpBackend`] in production and by scripted
/// backends in tests.
#[async_trait]
pub trait GenerationBackend {
    /// Perform one generation call for `task` against `profile`.
    async fn execute(&self, profile: &ModelProfile, task: &GenerationTask) -> AttemptOutcome;
}

/// Backend that calls real chat-completion endpoints over HTTPS.
///
/// One shared connection pool; per-call timeouts come from the profile,
/// not from the client, so profiles with different latency envelopes
/// can coexist.
pub struct HttpBackend {
    client: Client,
}

impl HttpBackend {
    pub fn new() -> OrchestratorResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Build the auth and content-type headers for a profile.
    fn build_headers(profile: &ModelProfile) -> Result<header::HeaderMap, String> {
        let mut headers = header::HeaderMap::new();

        let key_value = match profile.auth {
            AuthScheme::Bearer => format!("Bearer {}", profile.api_key),
            AuthScheme::ApiKeyHeader => profile.api_key.clone(),
        };
        let header_name = match profile.auth {
            AuthScheme::Bearer => header::AUTHORIZATION,
            AuthScheme::ApiKeyHeader => header::HeaderName::from_static("api-key"),
        };
        headers.insert(
            header_name,
            header::HeaderValue::from_str(&key_value)
                .map_err(|e| format!("Invalid API key format: {}", e))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn execute(&self, profile: &ModelProfile, task: &GenerationTask) -> AttemptOutcome {
        let start = Instant::now();

        // A profile that cannot produce a URL or headers is a malformed
        // request: fatal, since retrying cannot fix configuration.
        let url = match profile.build_url() {
            Ok(url) => url,
            Err(e) => {
                return AttemptOutcome::Failure {
                    kind: FailureKind::Validation,
                    detail: e.to_string(),
                    latency: start.elapsed(),
                }
            }
        };
        let headers = match Self::build_headers(profile) {
            Ok(headers) => headers,
            Err(detail) => {
                return AttemptOutcome::Failure {
                    kind: FailureKind::Validation,
                    detail,
                    latency: start.elapsed(),
                }
            }
        };

        let body = ChatRequest::from_task(&profile.deployment, task);
        debug!(
            "Executing task '{}' against {} ({})",
            task.id, profile.id, profile.provider
        );

        let response = match self
            .client
            .post(url)
            .headers(headers)
            .timeout(profile.timeout)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Task '{}' transport failure on {}: {}", task.id, profile.id, e);
                return AttemptOutcome::Failure {
                    kind: FailureKind::TransientNetwork,
                    detail: e.to_string(),
                    latency: start.elapsed(),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let kind = FailureKind::from_response(status, &body_text);
            warn!(
                "Task '{}' failed on {} with {} ({})",
                task.id, profile.id, status, kind
            );
            return AttemptOutcome::Failure {
                kind,
                detail: format!("{}: {}", status, body_text),
                latency: start.elapsed(),
            };
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                return AttemptOutcome::Failure {
                    kind: FailureKind::Validation,
                    detail: format!("Unparseable response: {}", e),
                    latency: start.elapsed(),
                }
            }
        };

        let Some(choice) = parsed.choices.into_iter().next() else {
            return AttemptOutcome::Failure {
                kind: FailureKind::Validation,
                detail: "Response contained no choices".to_string(),
                latency: start.elapsed(),
            };
        };

        AttemptOutcome::Success {
            content: choice.message.content,
            usage: parsed.usage.unwrap_or_default(),
            latency: start.elapsed(),
        }
    }
}
