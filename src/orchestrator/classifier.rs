use std::sync::Arc;

use log::debug;

use crate::orchestrator::tasks::{GenerationTask, TaskIntent};
use crate::registry::catalog::ModelRegistry;
use crate::registry::profile::{ModelProfile, RoleTag};

/// Maps a task's declared intent to an ordered fallback chain.
///
/// Creative and personalization work goes to the creative tier first,
/// analytical work to the analytical tier, bulk work (and anything the
/// registry cannot serve at its preferred tier) to the bulk tier.
/// Classification never fails: a registry is non-empty by construction,
/// so there is always a chain, even if it is only the cheapest profiles.
pub struct TaskClassifier {
    registry: Arc<ModelRegistry>,
}

impl TaskClassifier {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Preferred role tier for an intent.
    pub fn preferred_role(intent: TaskIntent) -> RoleTag {
        match intent {
            TaskIntent::Creative | TaskIntent::Personalization => RoleTag::Creative,
            TaskIntent::Analytical => RoleTag::Analytical,
            TaskIntent::Bulk => RoleTag::Bulk,
        }
    }

    /// Resolve a task to its fallback chain, most-preferred profile first.
    pub fn classify(&self, task: &GenerationTask) -> Vec<Arc<ModelProfile>> {
        let preferred = Self::preferred_role(task.intent);

        if let Ok(chain) = self.registry.resolve(preferred) {
            return chain;
        }

        // Degrade to the bulk tier when the preferred tier has no
        // profiles; cheapest available service beats blocking the batch.
        if preferred != RoleTag::Bulk {
            if let Ok(chain) = self.registry.resolve(RoleTag::Bulk) {
                debug!(
                    "Task '{}': no '{}' profiles, degrading to bulk tier",
                    task.id, preferred
                );
                return chain;
            }
        }

        // No profile carries the preferred role or the bulk role. Fall
        // back to the whole catalog, cost decreasing along the chain.
        debug!(
            "Task '{}': no '{}' or bulk profiles, using full catalog",
            task.id, preferred
        );
        let mut chain: Vec<Arc<ModelProfile>> = self.registry.iter().cloned().collect();
        chain.sort_by(|a, b| {
            b.cost_weight
                .partial_cmp(&a.cost_weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        chain
    }
}
