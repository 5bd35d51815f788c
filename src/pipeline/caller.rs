//! The model-caller boundary.
//!
//! The pipeline only ever sees [`ModelCaller`]. Whether a caller wraps a
//! hosted API or a locally served model is decided when the caller is built.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::providers::{CompletionRequest, LlmProvider, Message, ProviderError, StopReason};

/// Text in, text out.
#[async_trait]
pub trait ModelCaller: Send + Sync {
    /// Send a single prompt as the user turn.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, quota or parse failure.
    async fn call(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Send `prompt` as instructions and `input` as the raw user text.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, quota or parse failure.
    async fn call_with_input(&self, prompt: &str, input: &str) -> Result<String, ProviderError>;

    /// Model spec recorded next to every output this caller produces.
    fn model_id(&self) -> &str;
}

/// [`ModelCaller`] backed by an [`LlmProvider`].
#[derive(Clone)]
pub struct ProviderCaller {
    provider: Arc<dyn LlmProvider>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    stage: &'static str,
}

impl ProviderCaller {
    /// Wrap a provider with backend defaults for sampling.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            max_tokens: None,
            temperature: None,
            stage: "model",
        }
    }

    /// Label this caller's pipeline stage in logs, e.g. `base` or `edit`.
    pub fn with_stage(mut self, stage: &'static str) -> Self {
        self.stage = stage;
        self
    }

    /// Stage label used in logs.
    pub fn stage(&self) -> &'static str {
        self.stage
    }

    /// Cap completion length.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    async fn complete(
        &self,
        system: Option<String>,
        message: Message,
    ) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            messages: vec![message],
            system,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let response = self.provider.complete(request).await?;
        debug!(
            model = self.provider.model_id(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "completion received"
        );
        if response.stop_reason == StopReason::MaxTokens {
            warn!(
                model = self.provider.model_id(),
                stage = self.stage,
                max_tokens = ?self.max_tokens,
                "completion truncated at max_tokens"
            );
        }
        Ok(response.text)
    }
}

#[async_trait]
impl ModelCaller for ProviderCaller {
    async fn call(&self, prompt: &str) -> Result<String, ProviderError> {
        self.complete(None, Message::user(prompt)).await
    }

    async fn call_with_input(&self, prompt: &str, input: &str) -> Result<String, ProviderError> {
        self.complete(Some(prompt.to_owned()), Message::user(input))
            .await
    }

    fn model_id(&self) -> &str {
        self.provider.model_id()
    }
}
