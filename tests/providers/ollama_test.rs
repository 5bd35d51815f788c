//! Ollama provider wire format tests.

use serde_json::json;
use stylesim::providers::ollama::{
    build_request, parse_response, OllamaProvider, DEFAULT_OLLAMA_URL,
};
use stylesim::providers::{CompletionRequest, Message, Role, StopReason};

fn simple_request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::user("Hello")],
        system: Some("Summarize the input.".to_owned()),
        max_tokens: Some(512),
        temperature: Some(0.0),
    }
}

#[test]
fn build_request_injects_system_message() {
    let req = build_request("phi4-mini", &simple_request());
    assert_eq!(req.model, "phi4-mini");
    assert!(!req.stream);
    assert_eq!(req.messages.len(), 2);
    assert_eq!(req.messages[0].role, "system");
    assert_eq!(req.messages[0].content, "Summarize the input.");
    assert_eq!(req.messages[1].role, "user");
    assert_eq!(req.messages[1].content, "Hello");
}

#[test]
fn build_request_no_system_when_absent() {
    let mut request = simple_request();
    request.system = None;
    let req = build_request("model", &request);
    assert_eq!(req.messages.len(), 1);
    assert_eq!(req.messages[0].role, "user");
}

#[test]
fn build_request_sets_options() {
    let req = build_request("model", &simple_request());
    let opts = req.options.expect("options should exist");
    assert_eq!(opts.num_predict, Some(512));
    assert_eq!(opts.temperature, Some(0.0));
}

#[test]
fn build_request_omits_options_when_unset() {
    let request = CompletionRequest {
        messages: vec![Message::user("Hi")],
        ..CompletionRequest::default()
    };
    let req = build_request("model", &request);
    assert!(req.options.is_none());

    let value = serde_json::to_value(&req).expect("request should serialize");
    assert!(value.get("options").is_none());
}

#[test]
fn build_request_maps_roles() {
    let request = CompletionRequest {
        messages: vec![
            Message {
                role: Role::System,
                content: "sys".to_owned(),
            },
            Message::user("usr"),
            Message {
                role: Role::Assistant,
                content: "ast".to_owned(),
            },
        ],
        ..CompletionRequest::default()
    };
    let req = build_request("model", &request);
    assert_eq!(req.messages[0].role, "system");
    assert_eq!(req.messages[1].role, "user");
    assert_eq!(req.messages[2].role, "assistant");
}

#[test]
fn parse_response_extracts_text_and_usage() {
    let body = json!({
        "model": "phi4-mini",
        "message": {"role": "assistant", "content": "A short summary."},
        "done": true,
        "done_reason": "stop",
        "prompt_eval_count": 42,
        "eval_count": 7
    })
    .to_string();

    let resp = parse_response(&body).expect("should parse");
    assert_eq!(resp.text, "A short summary.");
    assert_eq!(resp.stop_reason, StopReason::EndTurn);
    assert_eq!(resp.usage.input_tokens, 42);
    assert_eq!(resp.usage.output_tokens, 7);
    assert_eq!(resp.model, "phi4-mini");
}

#[test]
fn parse_response_maps_length_to_max_tokens() {
    let body = json!({
        "model": "m",
        "message": {"role": "assistant", "content": "cut"},
        "done_reason": "length"
    })
    .to_string();

    let resp = parse_response(&body).expect("should parse");
    assert_eq!(resp.stop_reason, StopReason::MaxTokens);
    assert_eq!(resp.usage.input_tokens, 0);
}

#[test]
fn parse_response_rejects_invalid_json() {
    assert!(parse_response("not json").is_err());
}

#[test]
fn provider_defaults_to_local_url() {
    let provider = OllamaProvider::new("ollama/phi4-mini".to_owned(), "phi4-mini".to_owned());
    assert_eq!(provider.base_url, DEFAULT_OLLAMA_URL);
    assert_eq!(provider.model, "phi4-mini");

    let provider = provider.with_base_url("http://gpu-box:11434/");
    assert_eq!(provider.base_url, "http://gpu-box:11434");
}
