use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::errors::{OrchestratorError, OrchestratorResult};
use crate::registry::profile::{ModelProfile, RoleTag};

/// Ordered, immutable catalog of model profiles.
///
/// Declaration order is meaningful: within a role it expresses
/// preference, most capable or most trusted first. The registry is
/// read-only after construction and safe to share across tasks without
/// locking.
pub struct ModelRegistry {
    profiles: Vec<Arc<ModelProfile>>,
}

impl ModelRegistry {
    /// Create a registry from an ordered list of profiles.
    ///
    /// Fails on an empty list or duplicate profile ids.
    pub fn new(profiles: Vec<ModelProfile>) -> OrchestratorResult<Self> {
        if profiles.is_empty() {
            return Err(OrchestratorError::ConfigError(
                "Model registry requires at least one profile".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for profile in &profiles {
            if !seen.insert(profile.id.clone()) {
                return Err(OrchestratorError::ConfigError(format!(
                    "Duplicate profile id '{}' in registry",
                    profile.id
                )));
            }
        }

        Ok(Self {
            profiles: profiles.into_iter().map(Arc::new).collect(),
        })
    }

    /// Look up a profile by id.
    pub fn get(&self, id: &str) -> Option<Arc<ModelProfile>> {
        self.profiles.iter().find(|p| p.id == id).cloned()
    }

    /// Resolve a role to an ordered list of candidate profiles.
    ///
    /// Same-role profiles come first, in declaration order. The rest of
    /// the catalog follows as a cross-role fallback, ordered by
    /// decreasing cost weight so the chain degrades toward the cheapest
    /// deployment. Fails with `UnknownRole` when no profile carries the
    /// requested role.
    pub fn resolve(&self, role: RoleTag) -> OrchestratorResult<Vec<Arc<ModelProfile>>> {
        let mut chain: Vec<Arc<ModelProfile>> = self
            .profiles
            .iter()
            .filter(|p| p.role == role)
            .cloned()
            .collect();

        if chain.is_empty() {
            return Err(OrchestratorError::UnknownRole(role.to_string()));
        }

        let mut others: Vec<Arc<ModelProfile>> = self
            .profiles
            .iter()
            .filter(|p| p.role != role)
            .cloned()
            .collect();
        // Stable sort keeps declaration order among equal weights.
        others.sort_by(|a, b| {
            b.cost_weight
                .partial_cmp(&a.cost_weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        chain.extend(others);

        debug!(
            "Resolved role '{}' to chain: [{}]",
            role,
            chain
                .iter()
                .map(|p| p.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(chain)
    }

    /// Number of profiles in the catalog.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the catalog is empty. Always false for a constructed
    /// registry, kept for API completeness.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate over all profiles in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModelProfile>> {
        self.profiles.iter()
    }
}
