use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::errors::OrchestratorResult;
use crate::executor::http::GenerationBackend;
use crate::orchestrator::backoff::BackoffPolicy;
use crate::orchestrator::controller::RetryPolicy;
use crate::orchestrator::scheduler::Orchestrator;
use crate::registry::catalog::ModelRegistry;
use crate::registry::profile::{ModelProfile, ProviderKind, RoleTag};

/// Orchestrator builder.
///
/// Profiles are configured fluently: `add_profile` starts a profile and
/// the calls that follow (`.role()`, `.cost_weight()`, `.endpoint()`,
/// ...) apply to the most recently added one.
pub struct OrchestratorBuilder {
    profiles: Vec<ModelProfile>,
    policy: RetryPolicy,
    pool_size: Option<usize>,
    backend: Option<Arc<dyn GenerationBackend + Send + Sync>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            profiles: Vec::new(),
            policy: RetryPolicy::default(),
            pool_size: None,
            backend: None,
        }
    }

    /// Begins configuring a new model profile.
    /// Subsequent calls like `.role()` or `.endpoint()` apply to this profile.
    pub fn add_profile(
        mut self,
        id: impl Into<String>,
        provider: ProviderKind,
        deployment: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.profiles
            .push(ModelProfile::new(id, provider, deployment, api_key));
        self
    }

    /// Sets the role tag for the *last added* profile.
    /// Panics if `add_profile` was not called before this.
    pub fn role(mut self, role: RoleTag) -> Self {
        let profile = self.last_profile(".role()");
        profile.role = role;
        self
    }

    /// Sets the cost weight for the *last added* profile.
    /// Panics if `add_profile` was not called before this.
    pub fn cost_weight(mut self, weight: f32) -> Self {
        let profile = self.last_profile(".cost_weight()");
        profile.cost_weight = weight;
        self
    }

    /// Sets the endpoint template for the *last added* profile.
    /// Panics if `add_profile` was not called before this.
    pub fn endpoint(mut self, template: impl Into<String>) -> Self {
        let profile = self.last_profile(".endpoint()");
        profile.endpoint_template = template.into();
        self
    }

    /// Sets the api-version query parameter for the *last added* profile.
    /// Panics if `add_profile` was not called before this.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        let profile = self.last_profile(".api_version()");
        profile.api_version = Some(version.into());
        self
    }

    /// Sets the request timeout for the *last added* profile.
    /// Panics if `add_profile` was not called before this.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let profile = self.last_profile(".timeout()");
        profile.timeout = timeout;
        self
    }

    /// Sets the maximum attempts per profile before escalation.
    pub fn retries_per_profile(mut self, retries: usize) -> Self {
        self.policy.retries_per_profile = retries.max(1);
        self
    }

    /// Sets the exponential backoff base and cap.
    pub fn backoff(mut self, base: Duration, cap: Duration) -> Self {
        self.policy.backoff = BackoffPolicy::new(base, cap);
        self
    }

    /// Sets the default worker pool size for batches created with
    /// [`Orchestrator::batch`].
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = Some(size.max(1));
        self
    }

    /// Replaces the HTTP backend. Mostly a test seam.
    pub fn backend(mut self, backend: Arc<dyn GenerationBackend + Send + Sync>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Consumes the builder and constructs the `Orchestrator`.
    /// Returns an error for an empty or duplicated profile catalog.
    pub fn build(self) -> OrchestratorResult<Orchestrator> {
        for profile in &self.profiles {
            debug!(
                "Registering profile '{}' ({}, role {}, cost {})",
                profile.id, profile.provider, profile.role, profile.cost_weight
            );
        }

        let registry = ModelRegistry::new(self.profiles)?;
        let mut orchestrator = match self.backend {
            Some(backend) => Orchestrator::with_backend(registry, backend, self.policy),
            None => Orchestrator::new(registry, self.policy)?,
        };
        if let Some(size) = self.pool_size {
            orchestrator.set_default_pool_size(size);
        }
        Ok(orchestrator)
    }

    fn last_profile(&mut self, method: &str) -> &mut ModelProfile {
        match self.profiles.last_mut() {
            Some(profile) => profile,
            None => panic!("'{}' called before '.add_profile()'", method),
        }
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
