/// Module for the static model catalog
///
/// The registry holds an ordered, immutable list of model profiles.
/// Each profile describes one callable deployment: which provider hosts
/// it, how to build its endpoint URL, how to authenticate, what role it
/// plays (creative, analytical, bulk) and what it costs relative to the
/// other profiles. Adding a provider means adding a profile entry, not
/// code.
pub mod catalog;
pub mod profile;

pub use catalog::ModelRegistry;
pub use profile::{AuthScheme, ModelProfile, ProviderKind, RoleTag};
