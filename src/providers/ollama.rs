//! Ollama provider implementation using the `/api/chat` API.
//!
//! Serves locally loaded models. Some local chat templates echo the prompt
//! back at the start of the response; callers that care strip it (see
//! [`crate::pipeline::strip_prompt_echo`]).

use serde::{Deserialize, Serialize};

use super::{
    check_http_response, CompletionRequest, CompletionResponse, LlmProvider, ProviderError,
    StopReason, UsageStats,
};

/// Default Ollama API base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Ollama chat API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OllamaRequest {
    /// Model name.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<OllamaMessage>,
    /// Disable streaming for non-streaming calls.
    pub stream: bool,
    /// Generation options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OllamaOptions>,
}

/// A message in Ollama format.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct OllamaMessage {
    /// Role: "system", "user" or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
}

/// Ollama generation options.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OllamaOptions {
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Ollama chat API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OllamaResponse {
    /// Response message.
    pub message: OllamaMessage,
    /// Model that served the response.
    pub model: String,
    /// Why generation ended (`stop`, `length`).
    pub done_reason: Option<String>,
    /// Input token count.
    pub prompt_eval_count: Option<u32>,
    /// Output token count.
    pub eval_count: Option<u32>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Ollama chat API provider.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    model_spec: String,
    /// Model name passed to Ollama.
    #[doc(hidden)]
    pub model: String,
    /// Base URL for the Ollama API.
    #[doc(hidden)]
    pub base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create an Ollama provider for a model spec.
    pub fn new(model_spec: String, model_name: String) -> Self {
        Self {
            model_spec,
            model: model_name,
            base_url: DEFAULT_OLLAMA_URL.to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the provider at a different Ollama server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build an Ollama API request from a completion request.
#[doc(hidden)]
pub fn build_request(model: &str, request: &CompletionRequest) -> OllamaRequest {
    let mut messages: Vec<OllamaMessage> = Vec::new();

    // Inject system prompt as a system message if present.
    if let Some(system) = &request.system {
        messages.push(OllamaMessage {
            role: "system".to_owned(),
            content: system.clone(),
        });
    }

    for msg in &request.messages {
        messages.push(OllamaMessage {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        });
    }

    let options = if request.max_tokens.is_some() || request.temperature.is_some() {
        Some(OllamaOptions {
            num_predict: request.max_tokens,
            temperature: request.temperature,
        })
    } else {
        None
    };

    OllamaRequest {
        model: model.to_owned(),
        messages,
        stream: false,
        options,
    }
}

/// Parse an Ollama API response into a completion response.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the response cannot be deserialized.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<CompletionResponse, ProviderError> {
    let resp: OllamaResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let stop_reason = match resp.done_reason.as_deref() {
        Some("stop") | None => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some(other) => StopReason::Other(other.to_owned()),
    };

    let usage = UsageStats {
        input_tokens: resp.prompt_eval_count.unwrap_or(0),
        output_tokens: resp.eval_count.unwrap_or(0),
    };

    Ok(CompletionResponse {
        text: resp.message.content,
        stop_reason,
        usage,
        model: resp.model,
    })
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_request = build_request(&self.model, &request);

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn is_local(&self) -> bool {
        true
    }

    fn model_id(&self) -> &str {
        &self.model_spec
    }
}
