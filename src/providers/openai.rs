//! OpenAI provider implementation using the `/v1/chat/completions` API.

use serde::{Deserialize, Serialize};

use super::{
    check_http_response, CompletionRequest, CompletionResponse, LlmProvider, ProviderError,
    StopReason, UsageStats,
};

/// Default API base URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_MAX_TOKENS: u32 = 4000;

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// OpenAI chat completions API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<OpenAiMessage>,
    /// Maximum completion tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A message in OpenAI chat format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiMessage {
    /// Role (`system`, `user`, `assistant`).
    pub role: String,
    /// Text content.
    pub content: String,
}

/// OpenAI chat completions API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponse {
    /// Response choices.
    pub choices: Vec<OpenAiChoice>,
    /// Model that served the response.
    pub model: String,
    /// Token usage.
    pub usage: Option<OpenAiUsage>,
}

/// A response choice from OpenAI.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiChoice {
    /// Assistant message for this choice.
    pub message: OpenAiResponseMessage,
    /// Why generation stopped.
    pub finish_reason: Option<String>,
}

/// Assistant message from OpenAI.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponseMessage {
    /// Optional text content.
    pub content: Option<String>,
}

/// OpenAI usage statistics.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiUsage {
    /// Prompt token count.
    pub prompt_tokens: Option<u32>,
    /// Completion token count.
    pub completion_tokens: Option<u32>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// OpenAI chat completions API provider.
#[derive(Clone)]
pub struct OpenAiProvider {
    model_spec: String,
    model_name: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("model_spec", &self.model_spec)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a new OpenAI provider instance against the default endpoint.
    pub fn new(model_spec: String, model_name: String, api_key: String) -> Self {
        Self {
            model_spec,
            model_name,
            api_key,
            base_url: DEFAULT_OPENAI_URL.to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the provider at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build an OpenAI API request from a completion request.
#[doc(hidden)]
pub fn build_request(model: &str, request: &CompletionRequest) -> OpenAiRequest {
    let mut messages: Vec<OpenAiMessage> = Vec::new();

    if let Some(system) = &request.system {
        messages.push(OpenAiMessage {
            role: "system".to_owned(),
            content: system.clone(),
        });
    }

    for msg in &request.messages {
        messages.push(OpenAiMessage {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        });
    }

    OpenAiRequest {
        model: model.to_owned(),
        messages,
        max_tokens: Some(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
        temperature: request.temperature,
    }
}

/// Parse an OpenAI API response into a completion response.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the response cannot be deserialized or
/// has no choices.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<CompletionResponse, ProviderError> {
    let resp: OpenAiResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("missing choices[0]".to_owned()))?;

    let stop_reason = match choice.finish_reason.as_deref() {
        Some("stop") | None => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some(other) => StopReason::Other(other.to_owned()),
    };

    let usage = UsageStats {
        input_tokens: resp
            .usage
            .as_ref()
            .and_then(|u| u.prompt_tokens)
            .unwrap_or(0),
        output_tokens: resp
            .usage
            .as_ref()
            .and_then(|u| u.completion_tokens)
            .unwrap_or(0),
    };

    Ok(CompletionResponse {
        text: choice.message.content.unwrap_or_default(),
        stop_reason,
        usage,
        model: resp.model,
    })
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_request = build_request(&self.model_name, &request);

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn is_local(&self) -> bool {
        false
    }

    fn model_id(&self) -> &str {
        &self.model_spec
    }
}
