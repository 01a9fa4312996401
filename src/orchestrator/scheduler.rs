use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::{Mutex, Semaphore};

use crate::errors::OrchestratorResult;
use crate::executor::http::{GenerationBackend, HttpBackend};
use crate::metrics::{BatchMetrics, MetricsSnapshot};
use crate::orchestrator::arbiter::QualityArbiter;
use crate::orchestrator::classifier::TaskClassifier;
use crate::orchestrator::controller::{DeadProfiles, RetryController, RetryPolicy};
use crate::orchestrator::tasks::GenerationTask;
use crate::orchestrator::types::GenerationResult;
use crate::registry::catalog::ModelRegistry;
use crate::{constants, OrchestratorBuilder};

/// One batch of work: an ordered set of tasks plus the concurrency
/// limit and cancellation flag that govern its run.
///
/// Discarded once submitted; take a [`BatchHandle`] first if you need
/// to cancel the batch or watch its metrics while it runs.
pub struct BatchJob {
    pub tasks: Vec<GenerationTask>,
    pub concurrency: usize,
    cancel: Arc<AtomicBool>,
    metrics: Arc<BatchMetrics>,
}

impl BatchJob {
    pub fn new(tasks: Vec<GenerationTask>) -> Self {
        Self {
            tasks,
            concurrency: constants::DEFAULT_POOL_SIZE,
            cancel: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(BatchMetrics::new()),
        }
    }

    /// Sets the maximum number of simultaneously in-flight tasks.
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Control handle for this batch: cancellation plus live metrics.
    pub fn handle(&self) -> BatchHandle {
        BatchHandle {
            cancel: Arc::clone(&self.cancel),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Clonable handle to a submitted (or about-to-be-submitted) batch.
#[derive(Clone)]
pub struct BatchHandle {
    cancel: Arc<AtomicBool>,
    metrics: Arc<BatchMetrics>,
}

impl BatchHandle {
    /// Stop admitting new tasks into the pool. Advisory: already
    /// admitted tasks drain to their terminal states.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Live metrics snapshot; safe to call while the batch runs.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Everything a finished batch produced.
pub struct BatchReport {
    /// One result per admitted task, in completion-independent order
    /// (sorted by admission, since results are joined in admission order).
    pub results: Vec<GenerationResult>,
    pub metrics: MetricsSnapshot,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn result_for(&self, task_id: &str) -> Option<&GenerationResult> {
        self.results.iter().find(|r| r.task_id == task_id)
    }
}

/// Multi-provider generation orchestrator.
///
/// Owns the registry, the routing policy and the backend; batches flow
/// through [`Orchestrator::submit`]. The registry is shared read-only;
/// metrics are the only shared mutable state and live per batch.
pub struct Orchestrator {
    registry: Arc<ModelRegistry>,
    classifier: TaskClassifier,
    backend: Arc<dyn GenerationBackend + Send + Sync>,
    policy: RetryPolicy,
    default_pool_size: usize,
}

impl Orchestrator {
    /// Creates a builder for an Orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Create an orchestrator over the real HTTP backend.
    pub fn new(registry: ModelRegistry, policy: RetryPolicy) -> OrchestratorResult<Self> {
        let backend = Arc::new(HttpBackend::new()?);
        Ok(Self::with_backend(registry, backend, policy))
    }

    /// Create an orchestrator over an arbitrary backend.
    ///
    /// The seam the integration tests use to script provider behavior.
    pub fn with_backend(
        registry: ModelRegistry,
        backend: Arc<dyn GenerationBackend + Send + Sync>,
        policy: RetryPolicy,
    ) -> Self {
        let registry = Arc::new(registry);
        Self {
            classifier: TaskClassifier::new(Arc::clone(&registry)),
            registry,
            backend,
            policy,
            default_pool_size: constants::DEFAULT_POOL_SIZE,
        }
    }

    /// Build an orchestrator from a TOML configuration string.
    pub fn from_config_str(content: &str) -> OrchestratorResult<Self> {
        let config = crate::config::parse_config(content)?;
        Self::from_config(config)
    }

    /// Build an orchestrator from a TOML configuration file.
    pub fn from_config_file<P: AsRef<std::path::Path>>(path: P) -> OrchestratorResult<Self> {
        let config = crate::config::load_config(path)?;
        Self::from_config(config)
    }

    fn from_config(config: crate::config::Config) -> OrchestratorResult<Self> {
        let profiles = crate::config::build_profiles(&config)?;
        let policy = RetryPolicy {
            retries_per_profile: config.settings.retries_per_profile.max(1),
            backoff: crate::orchestrator::backoff::BackoffPolicy::new(
                std::time::Duration::from_millis(config.settings.backoff_base_ms),
                std::time::Duration::from_millis(config.settings.backoff_cap_ms),
            ),
        };
        let mut orchestrator = Self::new(ModelRegistry::new(profiles)?, policy)?;
        orchestrator.set_default_pool_size(config.settings.pool_size);
        Ok(orchestrator)
    }

    /// Sets the pool size used by [`Orchestrator::batch`].
    pub fn set_default_pool_size(&mut self, size: usize) {
        self.default_pool_size = size.max(1);
    }

    /// Create a batch job with this orchestrator's default pool size.
    pub fn batch(&self, tasks: Vec<GenerationTask>) -> BatchJob {
        BatchJob::new(tasks).concurrency(self.default_pool_size)
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Quality arbiter sharing this orchestrator's backend and policy.
    pub fn arbiter(&self) -> QualityArbiter {
        QualityArbiter::new(Arc::clone(&self.backend), self.policy)
    }

    /// Run a batch to completion under its concurrency limit.
    ///
    /// Admission semantics: a task enters the pool only after a worker
    /// slot is free and the batch has not been cancelled; a slot frees
    /// as soon as a task reaches any terminal state. Every admitted
    /// task yields exactly one result. One task's failure never affects
    /// another's scheduling.
    pub async fn submit(&self, job: BatchJob) -> BatchReport {
        let BatchJob {
            mut tasks,
            concurrency,
            cancel,
            metrics,
        } = job;

        info!(
            "Submitting batch of {} task(s), pool size {}",
            tasks.len(),
            concurrency
        );

        // Stable sort: equal priorities keep submission order.
        tasks.sort_by_key(|t| std::cmp::Reverse(t.priority));

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let dead: Arc<DeadProfiles> = Arc::new(Mutex::new(HashSet::new()));
        let controller = Arc::new(RetryController::new(Arc::clone(&self.backend), self.policy));

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            if cancel.load(Ordering::Acquire) {
                metrics.admission_skipped();
                continue;
            }

            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                // Semaphore closed only if something dropped it out from
                // under us; treat like cancellation.
                warn!("Batch semaphore closed before task admission");
                break;
            };

            // The batch may have been cancelled while we waited for a
            // slot; admission is the cutoff, so re-check under the permit.
            if cancel.load(Ordering::Acquire) {
                metrics.admission_skipped();
                drop(permit);
                continue;
            }

            let chain = self.classifier.classify(&task);
            let controller = Arc::clone(&controller);
            let dead = Arc::clone(&dead);
            let metrics = Arc::clone(&metrics);

            handles.push(tokio::spawn(async move {
                let result = controller.run(&task, &chain, &dead, &metrics).await;
                drop(permit);
                result
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => error!("Batch worker panicked: {}", e),
            }
        }

        let cancelled = cancel.load(Ordering::Acquire);
        let snapshot = metrics.snapshot();
        info!(
            "Batch finished: {} result(s), {} succeeded, {} exhausted, {} fatal{}",
            results.len(),
            snapshot.tasks_succeeded,
            snapshot.tasks_exhausted,
            snapshot.tasks_fatal,
            if cancelled { " (cancelled)" } else { "" }
        );

        BatchReport {
            results,
            metrics: snapshot,
            cancelled,
        }
    }
}
