use std::error::Error;
use std::fmt;

/// Custom error types for orchestrator operations
///
/// These cover crate-level problems (bad configuration, unknown roles,
/// malformed endpoint templates). Provider call failures never surface
/// here: the executor converts those into [`FailureKind`] data instead.
#[derive(Debug)]
pub enum OrchestratorError {
    /// Error from the HTTP client while building infrastructure
    RequestError(reqwest::Error),
    /// Configuration error
    ConfigError(String),
    /// No profile in the registry matches the requested role
    UnknownRole(String),
    /// An endpoint template could not be turned into a valid URL
    EndpointError(String),
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorError::RequestError(err) => write!(f, "Request error: {}", err),
            OrchestratorError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            OrchestratorError::UnknownRole(role) => write!(f, "Unknown role: {}", role),
            OrchestratorError::EndpointError(msg) => write!(f, "Endpoint error: {}", msg),
        }
    }
}

impl Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OrchestratorError::RequestError(err) => Some(err),
            _ => None,
        }
    }
}

/// Convert reqwest errors to OrchestratorError
impl From<reqwest::Error> for OrchestratorError {
    fn from(err: reqwest::Error) -> Self {
        OrchestratorError::RequestError(err)
    }
}

/// Convert std::io::Error to OrchestratorError
impl From<std::io::Error> for OrchestratorError {
    fn from(err: std::io::Error) -> Self {
        OrchestratorError::ConfigError(err.to_string())
    }
}

/// Convert toml parsing errors to OrchestratorError
impl From<toml::de::Error> for OrchestratorError {
    fn from(err: toml::de::Error) -> Self {
        OrchestratorError::ConfigError(err.to_string())
    }
}

/// Convert URL parsing errors to OrchestratorError
impl From<url::ParseError> for OrchestratorError {
    fn from(err: url::ParseError) -> Self {
        OrchestratorError::EndpointError(err.to_string())
    }
}

/// Result type alias for orchestrator operations
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Closed taxonomy of provider call failures.
///
/// Classified exactly once, at the executor boundary, and consumed as data
/// by the retry/fallback controller. The scheduler never inspects these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Invalid or revoked credential for a profile
    Auth,
    /// Provider signalled throttling
    RateLimit,
    /// Timeout, connection reset or similar transport failure
    TransientNetwork,
    /// Profile-level allowance used up
    QuotaExhausted,
    /// Provider accepted the request but its output is unusable
    Validation,
    /// Provider refused the content
    ContentPolicy,
}

impl FailureKind {
    /// Whether the controller may retry on the same profile with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::RateLimit | FailureKind::TransientNetwork)
    }

    /// Whether the profile is unusable for the rest of the task
    /// (escalate immediately, no further retries on this profile)
    pub fn exhausts_profile(&self) -> bool {
        matches!(self, FailureKind::Auth | FailureKind::QuotaExhausted)
    }

    /// Whether the task terminates immediately, with no retry or escalation
    pub fn is_fatal(&self) -> bool {
        matches!(self, FailureKind::Validation | FailureKind::ContentPolicy)
    }

    /// Classify an HTTP error response into a failure kind.
    ///
    /// Status codes take precedence; keyword matching on the body catches
    /// providers that report throttling or quota problems behind a generic
    /// status. Anything unrecognized is treated as transient, which keeps
    /// a flaky provider retryable instead of killing the task.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let msg_lower = body.to_lowercase();

        // Content refusals usually ride on a 400, so check the body first.
        if msg_lower.contains("content management policy")
            || msg_lower.contains("content_filter")
            || msg_lower.contains("content policy")
            || msg_lower.contains("safety system")
        {
            return FailureKind::ContentPolicy;
        }
        if msg_lower.contains("insufficient_quota")
            || msg_lower.contains("quota exceeded")
            || msg_lower.contains("billing")
        {
            return FailureKind::QuotaExhausted;
        }

        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return FailureKind::Auth;
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => return FailureKind::RateLimit,
            reqwest::StatusCode::BAD_REQUEST
            | reqwest::StatusCode::UNPROCESSABLE_ENTITY
            | reqwest::StatusCode::PAYLOAD_TOO_LARGE => return FailureKind::Validation,
            _ => {}
        }

        if msg_lower.contains("rate limit")
            || msg_lower.contains("too many requests")
            || msg_lower.contains("overloaded")
            || msg_lower.contains("throttle")
        {
            return FailureKind::RateLimit;
        }

        FailureKind::TransientNetwork
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Auth => write!(f, "auth"),
            FailureKind::RateLimit => write!(f, "rate_limit"),
            FailureKind::TransientNetwork => write!(f, "transient_network"),
            FailureKind::QuotaExhausted => write!(f, "quota_exhausted"),
            FailureKind::Validation => write!(f, "validation"),
            FailureKind::ContentPolicy => write!(f, "content_policy"),
        }
    }
}
