use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use log::info;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::executor::http::GenerationBackend;
use crate::metrics::BatchMetrics;
use crate::orchestrator::controller::{RetryController, RetryPolicy};
use crate::orchestrator::tasks::GenerationTask;
use crate::orchestrator::types::GenerationResult;
use crate::registry::profile::ModelProfile;

/// Pluggable scoring hook: `(prompt, candidate content) -> score`.
/// Higher is better. The orchestrator defines no scoring semantics of
/// its own; callers bring their own or use [`keyword_coverage`].
pub type ScoreFn = dyn Fn(&str, &str) -> f64 + Send + Sync;

/// Outcome of running one prompt across several profiles.
///
/// Immutable once computed. A comparison is a read-only overlay: the
/// candidate results inside it are exactly what each controller
/// produced, untouched by scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityComparison {
    pub task_id: String,
    /// Name of the scoring method, recorded for the audit trail.
    pub method: String,
    pub candidates: Vec<GenerationResult>,
    /// Scores parallel to `candidates`; `None` for failed candidates.
    pub scores: Vec<Option<f64>>,
    /// Profile id of the winning candidate, if any succeeded.
    pub winner_profile_id: Option<String>,
}

/// Runs identical tasks across multiple profiles purely to compare
/// output quality. Each candidate gets its own controller run, so the
/// usual retry/fallback rules apply per profile.
pub struct QualityArbiter {
    backend: Arc<dyn GenerationBackend + Send + Sync>,
    policy: RetryPolicy,
}

impl QualityArbiter {
    pub fn new(backend: Arc<dyn GenerationBackend + Send + Sync>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    /// Run `task` against every profile concurrently and score the
    /// successful outputs.
    ///
    /// Ties go to the earlier profile. With no successful candidate the
    /// comparison records no winner.
    pub async fn compare(
        &self,
        task: &GenerationTask,
        profiles: &[Arc<ModelProfile>],
        method: impl Into<String>,
        scorer: &ScoreFn,
    ) -> QualityComparison {
        let controller = RetryController::new(Arc::clone(&self.backend), self.policy);
        let metrics = BatchMetrics::new();

        let runs = profiles.iter().map(|profile| {
            let chain = vec![Arc::clone(profile)];
            let controller = &controller;
            let metrics = &metrics;
            async move {
                // Fresh quota memory per candidate: one candidate's quota
                // failure must not hide the profile from another.
                let dead = Mutex::new(HashSet::new());
                controller.run(task, &chain, &dead, metrics).await
            }
        });
        let candidates: Vec<GenerationResult> = join_all(runs).await;

        let scores: Vec<Option<f64>> = candidates
            .iter()
            .map(|c| c.content.as_deref().map(|content| scorer(&task.prompt, content)))
            .collect();

        let winner_profile_id = scores
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (i, s)))
            .max_by(|(ai, a), (bi, b)| {
                a.partial_cmp(b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // On ties prefer the earlier candidate.
                    .then(bi.cmp(ai))
            })
            .and_then(|(i, _)| candidates[i].profile_id.clone());

        let method = method.into();
        info!(
            "Quality comparison for task '{}' via '{}': {} candidate(s), winner {:?}",
            task.id,
            method,
            candidates.len(),
            winner_profile_id
        );

        QualityComparison {
            task_id: task.id.clone(),
            method,
            candidates,
            scores,
            winner_profile_id,
        }
    }
}

/// Default scoring heuristic: length-normalized keyword coverage.
///
/// Coverage is the fraction of distinct prompt keywords (4+ characters)
/// that appear in the candidate, discounted as the candidate grows past
/// a few hundred words. Rewards answers that address the prompt without
/// rewarding sheer verbosity.
pub fn keyword_coverage(prompt: &str, content: &str) -> f64 {
    let keywords: std::collections::HashSet<String> = prompt
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 4)
        .map(str::to_lowercase)
        .collect();

    if keywords.is_empty() {
        return if content.trim().is_empty() { 0.0 } else { 0.5 };
    }

    let content_lower = content.to_lowercase();
    let hits = keywords
        .iter()
        .filter(|k| content_lower.contains(k.as_str()))
        .count();
    let coverage = hits as f64 / keywords.len() as f64;

    let words = content.split_whitespace().count();
    coverage / (1.0 + words as f64 / 500.0)
}
