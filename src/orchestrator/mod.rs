pub mod arbiter;
pub mod backoff;
pub mod builder;
pub mod classifier;
pub mod controller;
pub mod scheduler;
pub mod tasks;
pub mod types;

pub use arbiter::{keyword_coverage, QualityArbiter, QualityComparison, ScoreFn};
pub use backoff::BackoffPolicy;
pub use builder::OrchestratorBuilder;
pub use classifier::TaskClassifier;
pub use controller::{RetryController, RetryPolicy};
pub use scheduler::{BatchHandle, BatchJob, BatchReport, Orchestrator};
pub use tasks::{GenerationParams, GenerationTask, TaskIntent};
pub use types::{GenerationAttempt, GenerationResult, TaskStatus};
