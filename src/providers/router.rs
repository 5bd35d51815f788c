//! Model router: resolves `<provider>/<model>` specs to provider instances.
//!
//! Providers are built on first request and cached by spec for the rest of
//! the process. There is no eviction.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::ProvidersConfig;
use crate::credentials::Credentials;

use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;
use super::LlmProvider;

/// Credential key for the hosted API.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Provider routing errors.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Model spec is not in `<provider>/<model>` format.
    #[error("invalid model spec '{spec}', expected '<provider>/<model>'")]
    InvalidModelSpec {
        /// Invalid raw spec.
        spec: String,
    },
    /// Unsupported provider type in spec prefix.
    #[error("unsupported provider '{provider}'")]
    UnsupportedProvider {
        /// Unsupported provider prefix.
        provider: String,
    },
    /// Required API credential missing for selected provider.
    #[error("missing credential for provider '{provider}': {key}")]
    MissingCredential {
        /// Provider name.
        provider: String,
        /// Missing credential key.
        key: String,
    },
}

/// Lazily populated cache of providers keyed by model spec.
#[derive(Clone)]
pub struct ModelRouter {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    settings: ProvidersConfig,
    credentials: Credentials,
}

impl ModelRouter {
    /// Create an empty router.
    pub fn new(settings: ProvidersConfig, credentials: Credentials) -> Self {
        Self {
            providers: HashMap::new(),
            settings,
            credentials,
        }
    }

    /// Create a router backed by a single provider for integration tests.
    #[doc(hidden)]
    pub fn for_testing(spec: String, provider: Arc<dyn LlmProvider>) -> Self {
        let mut router = Self::new(ProvidersConfig::default(), Credentials::default());
        router.providers.insert(spec, provider);
        router
    }

    /// Resolve a provider, building and caching it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec is malformed, names an unknown backend,
    /// or the backend's credential is missing.
    pub fn resolve(&mut self, spec: &str) -> Result<Arc<dyn LlmProvider>, RouterError> {
        if let Some(provider) = self.providers.get(spec) {
            return Ok(Arc::clone(provider));
        }
        let (provider, model) = parse_model_spec(spec)?;
        let instance = self.instantiate(spec, provider, model)?;
        info!(spec, local = instance.is_local(), "model provider loaded");
        self.providers.insert(spec.to_owned(), Arc::clone(&instance));
        Ok(instance)
    }

    /// Returns true when a spec has already been loaded.
    pub fn has_model(&self, spec: &str) -> bool {
        self.providers.contains_key(spec)
    }

    /// Returns the number of loaded providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Returns all loaded specs in sorted order.
    pub fn available_specs(&self) -> Vec<String> {
        let mut values: Vec<String> = self.providers.keys().cloned().collect();
        values.sort();
        values
    }

    fn instantiate(
        &self,
        spec: &str,
        provider: &str,
        model: &str,
    ) -> Result<Arc<dyn LlmProvider>, RouterError> {
        match provider {
            "openai" => {
                let key = self.credentials.get(OPENAI_API_KEY).ok_or_else(|| {
                    RouterError::MissingCredential {
                        provider: provider.to_owned(),
                        key: OPENAI_API_KEY.to_owned(),
                    }
                })?;
                Ok(Arc::new(
                    OpenAiProvider::new(spec.to_owned(), model.to_owned(), key.to_owned())
                        .with_base_url(&self.settings.openai_base_url),
                ))
            }
            "ollama" => Ok(Arc::new(
                OllamaProvider::new(spec.to_owned(), model.to_owned())
                    .with_base_url(&self.settings.ollama_base_url),
            )),
            _ => Err(RouterError::UnsupportedProvider {
                provider: provider.to_owned(),
            }),
        }
    }
}

/// Split a spec into `(provider, model)`. The model part may itself contain `/`.
///
/// # Errors
///
/// Returns [`RouterError::InvalidModelSpec`] when either half is empty.
pub fn parse_model_spec(spec: &str) -> Result<(&str, &str), RouterError> {
    match spec.split_once('/') {
        Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
            Ok((provider, model))
        }
        _ => Err(RouterError::InvalidModelSpec {
            spec: spec.to_owned(),
        }),
    }
}
