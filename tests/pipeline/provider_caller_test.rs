//! `ProviderCaller` message layout over a mock provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use stylesim::pipeline::{ModelCaller, ProviderCaller};
use stylesim::providers::{
    CompletionRequest, CompletionResponse, LlmProvider, ProviderError, Role, StopReason,
    UsageStats,
};

struct CapturingProvider {
    requests: Mutex<Vec<CompletionRequest>>,
    stop_reason: StopReason,
}

#[async_trait]
impl LlmProvider for CapturingProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.requests
            .lock()
            .expect("lock should not be poisoned")
            .push(request);
        Ok(CompletionResponse {
            text: "reply".to_owned(),
            stop_reason: self.stop_reason.clone(),
            usage: UsageStats {
                input_tokens: 3,
                output_tokens: 1,
            },
            model: "capture".to_owned(),
        })
    }

    fn is_local(&self) -> bool {
        true
    }

    fn model_id(&self) -> &str {
        "mock/capture"
    }
}

fn provider() -> Arc<CapturingProvider> {
    provider_stopping_with(StopReason::EndTurn)
}

fn provider_stopping_with(stop_reason: StopReason) -> Arc<CapturingProvider> {
    Arc::new(CapturingProvider {
        requests: Mutex::new(Vec::new()),
        stop_reason,
    })
}

#[tokio::test]
async fn call_sends_prompt_as_user_message() {
    let provider = provider();
    let caller = ProviderCaller::new(Arc::clone(&provider) as Arc<dyn LlmProvider>)
        .with_max_tokens(128)
        .with_temperature(0.2);

    let reply = caller.call("Summarize this.").await.expect("call should succeed");
    assert_eq!(reply, "reply");
    assert_eq!(caller.model_id(), "mock/capture");

    let requests = provider.requests.lock().expect("lock should not be poisoned");
    let request = &requests[0];
    assert!(request.system.is_none());
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].role, Role::User);
    assert_eq!(request.messages[0].content, "Summarize this.");
    assert_eq!(request.max_tokens, Some(128));
    assert_eq!(request.temperature, Some(0.2));
}

#[tokio::test]
async fn call_with_input_sends_prompt_as_system() {
    let provider = provider();
    let caller = ProviderCaller::new(Arc::clone(&provider) as Arc<dyn LlmProvider>);

    caller
        .call_with_input("Instructions.", "Raw document.")
        .await
        .expect("call should succeed");

    let requests = provider.requests.lock().expect("lock should not be poisoned");
    let request = &requests[0];
    assert_eq!(request.system.as_deref(), Some("Instructions."));
    assert_eq!(request.messages[0].content, "Raw document.");
    assert!(request.max_tokens.is_none());
}

#[tokio::test]
async fn truncated_completion_is_still_returned() {
    let provider = provider_stopping_with(StopReason::MaxTokens);
    let caller = ProviderCaller::new(Arc::clone(&provider) as Arc<dyn LlmProvider>)
        .with_max_tokens(1)
        .with_stage("edit");
    assert_eq!(caller.stage(), "edit");

    let reply = caller.call("Rewrite this.").await.expect("call should succeed");
    assert_eq!(reply, "reply");
    let requests = provider.requests.lock().expect("lock should not be poisoned");
    assert_eq!(requests[0].max_tokens, Some(1));
}

#[test]
fn stage_defaults_to_model() {
    let caller = ProviderCaller::new(provider() as Arc<dyn LlmProvider>);
    assert_eq!(caller.stage(), "model");
}
