//! Provider registry: which endpoint, default model and dimensionality each
//! embedding provider uses.
//!
//! The built-in set lives in [`BUILTIN_PROVIDERS`]. Adding a provider means
//! adding a row there; every provider must accept the shared
//! `{"input", "model"}` request body and answer with `data[0].embedding`.

use std::collections::BTreeMap;

use super::EmbeddingError;

/// `(identifier, endpoint, default model, default dimensions)`
const BUILTIN_PROVIDERS: &[(&str, &str, &str, usize)] = &[
    (
        "openai",
        "https://api.openai.com/v1/embeddings",
        "text-embedding-3-large",
        1536,
    ),
    (
        "mistral",
        "https://api.mistral.ai/v1/embeddings",
        "mistral-embed",
        1024,
    ),
];

/// Connection profile for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Full URL the embedding request is POSTed to.
    pub endpoint: String,
    /// Model sent when the caller does not override it.
    pub default_model: String,
    /// Vector length the default model produces. Informational, not enforced.
    pub default_dimensions: usize,
}

impl ProviderProfile {
    pub fn new(
        endpoint: impl Into<String>,
        default_model: impl Into<String>,
        default_dimensions: usize,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            default_model: default_model.into(),
            default_dimensions,
        }
    }
}

/// Immutable identifier → profile table. Identifiers are case-sensitive.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    profiles: BTreeMap<String, ProviderProfile>,
}

impl ProviderRegistry {
    /// The registry of providers this build supports.
    pub fn builtin() -> Self {
        Self::from_profiles(BUILTIN_PROVIDERS.iter().map(|&(id, endpoint, model, dims)| {
            (id.to_string(), ProviderProfile::new(endpoint, model, dims))
        }))
    }

    /// Build a registry from explicit entries. A later duplicate identifier
    /// replaces an earlier one.
    pub fn from_profiles(entries: impl IntoIterator<Item = (String, ProviderProfile)>) -> Self {
        Self {
            profiles: entries.into_iter().collect(),
        }
    }

    /// Resolve `provider` to its profile.
    pub fn lookup(&self, provider: &str) -> Result<&ProviderProfile, EmbeddingError> {
        self.profiles
            .get(provider)
            .ok_or_else(|| EmbeddingError::UnsupportedProvider {
                provider: provider.to_string(),
                supported: self.identifiers(),
            })
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProviderProfile)> {
        self.profiles.iter().map(|(id, profile)| (id.as_str(), profile))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Identifiers of the built-in providers, in table order.
pub fn builtin_identifiers() -> impl Iterator<Item = &'static str> {
    BUILTIN_PROVIDERS.iter().map(|&(id, ..)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_openai_profile() {
        let registry = ProviderRegistry::builtin();
        let profile = registry.lookup("openai").unwrap();
        assert_eq!(profile.endpoint, "https://api.openai.com/v1/embeddings");
        assert_eq!(profile.default_model, "text-embedding-3-large");
        assert_eq!(profile.default_dimensions, 1536);
    }

    #[test]
    fn builtin_mistral_profile() {
        let registry = ProviderRegistry::builtin();
        let profile = registry.lookup("mistral").unwrap();
        assert_eq!(profile.endpoint, "https://api.mistral.ai/v1/embeddings");
        assert_eq!(profile.default_model, "mistral-embed");
        assert_eq!(profile.default_dimensions, 1024);
    }

    #[test]
    fn dimensions_differ_across_builtin_providers() {
        let registry = ProviderRegistry::builtin();
        let dims: Vec<usize> = registry.iter().map(|(_, p)| p.default_dimensions).collect();
        assert!(dims.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn lookup_unknown_lists_supported_identifiers() {
        let registry = ProviderRegistry::builtin();
        match registry.lookup("anthropic") {
            Err(EmbeddingError::UnsupportedProvider {
                provider,
                supported,
            }) => {
                assert_eq!(provider, "anthropic");
                assert_eq!(supported, vec!["mistral".to_string(), "openai".to_string()]);
            }
            other => panic!("expected UnsupportedProvider, got {other:?}"),
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = ProviderRegistry::builtin();
        assert!(registry.lookup("OpenAI").is_err());
    }

    #[test]
    fn builtin_identifiers_match_registry() {
        let mut ids: Vec<String> = builtin_identifiers().map(String::from).collect();
        ids.sort();
        assert_eq!(ids, ProviderRegistry::builtin().identifiers());
    }

    #[test]
    fn from_profiles_replaces_duplicates() {
        let registry = ProviderRegistry::from_profiles([
            ("stub".to_string(), ProviderProfile::new("http://a", "m1", 3)),
            ("stub".to_string(), ProviderProfile::new("http://b", "m2", 4)),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("stub").unwrap().endpoint, "http://b");
    }
}
