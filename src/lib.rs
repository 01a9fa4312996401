//! RelayLLM is a Rust library that orchestrates LLM generation across multiple providers.
//!
//! It routes each task to the model deployment best suited for its declared
//! intent, fans batches out under a bounded worker pool, retries transient
//! failures with jittered backoff, escalates along a fallback chain when a
//! deployment becomes unusable, and can compare output quality across
//! deployments.
//!
//! # Features
//!
//! - **Model registry**: deployments described as data (endpoint template,
//!   auth scheme, role, cost); adding a provider means adding an entry
//! - **Intent routing**: creative, analytical, bulk and personalization
//!   tasks each resolve to an ordered fallback chain of deployments
//! - **Retry/fallback**: a closed failure taxonomy drives retry with
//!   exponential backoff, escalation to the next deployment, or fail-fast
//! - **Bounded batches**: configurable worker pool with advisory
//!   cancellation and exactly one result per admitted task
//! - **Quality arbitration**: run one prompt across several deployments and
//!   score the outputs with a pluggable heuristic
//! - **Batch metrics**: attempts, escalations, token usage, latency and a
//!   cost-avoidance estimate, collected without blocking the pipeline
//!
//! # Example
//!
//! ```no_run
//! use relayllm::{Orchestrator, GenerationTask, TaskIntent, ProviderKind, RoleTag};
//!
//! async fn example() {
//!     let orchestrator = Orchestrator::builder()
//!         .add_profile("tutor", ProviderKind::OpenAi, "gpt-4o", "api-key")
//!         .role(RoleTag::Creative)
//!         .cost_weight(10.0)
//!         .add_profile("seeder", ProviderKind::GitHubModels, "gpt-4o-mini", "token")
//!         .role(RoleTag::Bulk)
//!         .cost_weight(0.6)
//!         .pool_size(3)
//!         .build()
//!         .expect("Failed to build orchestrator");
//!
//!     let tasks = vec![
//!         GenerationTask::new("lesson-1", "Write a lesson hook about fractions")
//!             .intent(TaskIntent::Creative),
//!         GenerationTask::new("seed-1", "Generate a sample quiz question"),
//!     ];
//!
//!     let report = orchestrator.submit(orchestrator.batch(tasks)).await;
//!     for result in &report.results {
//!         println!("{}: {:?}", result.task_id, result.status);
//!     }
//! }
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod executor;
pub mod metrics;
pub mod orchestrator;
pub mod registry;

pub use errors::{FailureKind, OrchestratorError, OrchestratorResult};

pub use registry::{AuthScheme, ModelProfile, ModelRegistry, ProviderKind, RoleTag};

pub use executor::{AttemptOutcome, ChatMessage, ChatRequest, ChatResponse, GenerationBackend, HttpBackend, TokenUsage};

pub use orchestrator::{
    keyword_coverage, BackoffPolicy, BatchHandle, BatchJob, BatchReport, GenerationAttempt,
    GenerationParams, GenerationResult, GenerationTask, Orchestrator, OrchestratorBuilder,
    QualityArbiter, QualityComparison, RetryPolicy, ScoreFn, TaskClassifier, TaskIntent,
    TaskStatus,
};

pub use metrics::{BatchMetrics, MetricsSnapshot};

#[cfg(feature = "metrics")]
pub use metrics::describe_metrics;

/// Initialize the logging system
///
/// This should be called at the start of your application in case
/// you want to activate the library's debug and info logging.
pub fn use_logging() {
    env_logger::init();
}
