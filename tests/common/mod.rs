//! Shared test support: a scripted backend standing in for provider HTTP.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use relayllm::{
    AttemptOutcome, FailureKind, GenerationBackend, GenerationTask, ModelProfile, ModelRegistry,
    Orchestrator, ProviderKind, RetryPolicy, RoleTag, TokenUsage,
};

/// One scripted call outcome.
#[derive(Clone)]
pub enum Script {
    Ok(&'static str),
    Fail(FailureKind),
}

/// Backend that replays scripted outcomes instead of calling providers.
///
/// Outcomes are keyed by `(task id, profile id)` and consumed in order;
/// calls with no script left fall back to `default_outcome`. The backend
/// also tracks the high-water mark of concurrent calls so scheduler
/// tests can assert the pool bound.
pub struct MockBackend {
    scripts: Mutex<HashMap<(String, String), VecDeque<Script>>>,
    default_outcome: Script,
    calls: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            default_outcome: Script::Ok("generated content"),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Every unscripted call fails with `kind`.
    pub fn failing(kind: FailureKind) -> Self {
        Self {
            default_outcome: Script::Fail(kind),
            ..Self::new()
        }
    }

    /// Hold each call open for `delay`, so concurrency is observable.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue outcomes for calls of `task_id` against `profile_id`.
    pub fn script(&self, task_id: &str, profile_id: &str, outcomes: Vec<Script>) {
        self.scripts
            .lock()
            .unwrap()
            .insert((task_id.to_string(), profile_id.to_string()), outcomes.into());
    }

    /// `(task id, profile id)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Highest number of simultaneously in-flight calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn execute(&self, profile: &ModelProfile, task: &GenerationTask) -> AttemptOutcome {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.calls
            .lock()
            .unwrap()
            .push((task.id.clone(), profile.id.clone()));

        let script = {
            let mut scripts = self.scripts.lock().unwrap();
            scripts
                .get_mut(&(task.id.clone(), profile.id.clone()))
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| self.default_outcome.clone())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match script {
            Script::Ok(content) => AttemptOutcome::Success {
                content: content.to_string(),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                    total_tokens: 30,
                },
                latency: Duration::from_millis(5),
            },
            Script::Fail(kind) => AttemptOutcome::Failure {
                kind,
                detail: format!("scripted {} failure", kind),
                latency: Duration::from_millis(5),
            },
        }
    }
}

/// Profile with test-friendly defaults.
pub fn profile(id: &str, role: RoleTag, cost_weight: f32) -> ModelProfile {
    ModelProfile::new(id, ProviderKind::OpenAi, "gpt-test", "test-key")
        .role(role)
        .cost_weight(cost_weight)
}

/// Fast retry policy: near-zero backoff so tests stay quick.
pub fn fast_policy(retries_per_profile: usize) -> RetryPolicy {
    RetryPolicy {
        retries_per_profile,
        backoff: relayllm::BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(2)),
    }
}

/// Orchestrator over a mock backend.
pub fn orchestrator(
    profiles: Vec<ModelProfile>,
    backend: std::sync::Arc<MockBackend>,
    retries_per_profile: usize,
) -> Orchestrator {
    let registry = ModelRegistry::new(profiles).unwrap();
    Orchestrator::with_backend(registry, backend, fast_policy(retries_per_profile))
}
