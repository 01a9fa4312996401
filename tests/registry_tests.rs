//! Tests for the model registry: resolution order, URL building.

mod common;

use common::profile;
use relayllm::{
    ModelProfile, ModelRegistry, OrchestratorError, ProviderKind, RoleTag,
};

// ============================================================================
// Construction
// ============================================================================

#[test]
fn empty_registry_is_rejected() {
    let result = ModelRegistry::new(vec![]);
    assert!(matches!(result, Err(OrchestratorError::ConfigError(_))));
}

#[test]
fn duplicate_ids_are_rejected() {
    let result = ModelRegistry::new(vec![
        profile("a", RoleTag::Bulk, 1.0),
        profile("a", RoleTag::Creative, 2.0),
    ]);
    assert!(matches!(result, Err(OrchestratorError::ConfigError(_))));
}

// ============================================================================
// Role resolution
// ============================================================================

#[test]
fn same_role_profiles_keep_declaration_order() {
    let registry = ModelRegistry::new(vec![
        profile("first", RoleTag::Bulk, 2.0),
        profile("second", RoleTag::Bulk, 1.0),
    ])
    .unwrap();

    let chain = registry.resolve(RoleTag::Bulk).unwrap();
    let ids: Vec<&str> = chain.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
}

#[test]
fn cross_role_fallback_orders_by_decreasing_cost() {
    let registry = ModelRegistry::new(vec![
        profile("creative-big", RoleTag::Creative, 10.0),
        profile("analytical-mid", RoleTag::Analytical, 4.0),
        profile("bulk-small", RoleTag::Bulk, 0.5),
    ])
    .unwrap();

    let chain = registry.resolve(RoleTag::Bulk).unwrap();
    let ids: Vec<&str> = chain.iter().map(|p| p.id.as_str()).collect();
    // Own role first, then the rest with cost decreasing along the chain.
    assert_eq!(ids, vec!["bulk-small", "creative-big", "analytical-mid"]);
}

#[test]
fn unknown_role_fails_resolution() {
    let registry = ModelRegistry::new(vec![profile("bulk", RoleTag::Bulk, 1.0)]).unwrap();
    let result = registry.resolve(RoleTag::Creative);
    assert!(matches!(result, Err(OrchestratorError::UnknownRole(_))));
}

#[test]
fn lookup_by_id() {
    let registry = ModelRegistry::new(vec![profile("a", RoleTag::Bulk, 1.0)]).unwrap();
    assert!(registry.get("a").is_some());
    assert!(registry.get("missing").is_none());
}

// ============================================================================
// Endpoint construction
// ============================================================================

#[test]
fn azure_url_embeds_deployment_and_api_version() {
    let profile = ModelProfile::new("az", ProviderKind::AzureOpenAi, "gpt-4o", "key")
        .endpoint("https://edu-east.openai.azure.com/openai/deployments/{deployment}/chat/completions");

    let url = profile.build_url().unwrap();
    assert_eq!(url.host_str(), Some("edu-east.openai.azure.com"));
    assert!(url.path().contains("/deployments/gpt-4o/"));
    assert!(url
        .query_pairs()
        .any(|(k, _)| k == "api-version"));
}

#[test]
fn openai_url_uses_fixed_host_without_api_version() {
    let profile = ModelProfile::new("oa", ProviderKind::OpenAi, "gpt-4o", "key");

    let url = profile.build_url().unwrap();
    assert_eq!(url.as_str(), "https://api.openai.com/v1/chat/completions");
}

#[test]
fn github_models_use_their_own_host() {
    let profile = ModelProfile::new("gh", ProviderKind::GitHubModels, "gpt-4o-mini", "token");

    let url = profile.build_url().unwrap();
    assert_eq!(url.host_str(), Some("models.inference.ai.azure.com"));
}

#[test]
fn azure_profile_without_endpoint_cannot_build_url() {
    let profile = ModelProfile::new("az", ProviderKind::AzureOpenAi, "gpt-4o", "key");
    assert!(profile.build_url().is_err());
}

// ============================================================================
// Provider defaults
// ============================================================================

#[test]
fn provider_names_parse_from_config_spellings() {
    assert_eq!(ProviderKind::parse("azure"), Some(ProviderKind::AzureOpenAi));
    assert_eq!(ProviderKind::parse("azure_openai"), Some(ProviderKind::AzureOpenAi));
    assert_eq!(ProviderKind::parse("OpenAI"), Some(ProviderKind::OpenAi));
    assert_eq!(ProviderKind::parse("github"), Some(ProviderKind::GitHubModels));
    assert_eq!(ProviderKind::parse("GROQ"), Some(ProviderKind::Groq));
    assert_eq!(ProviderKind::parse("mystery"), None);
}

#[test]
fn role_names_parse_from_config_spellings() {
    assert_eq!(RoleTag::parse("creative"), Some(RoleTag::Creative));
    assert_eq!(RoleTag::parse("Analytical"), Some(RoleTag::Analytical));
    assert_eq!(RoleTag::parse("BULK"), Some(RoleTag::Bulk));
    assert_eq!(RoleTag::parse("wizard"), None);
}
