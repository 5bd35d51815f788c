//! HTTP response sanitization and truncation tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use stylesim::providers::{check_http_response, ProviderError};

async fn serve_once(status_line: &str, body: &str) -> String {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) => panic!("listener should bind: {err}"),
    };
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(err) => panic!("listener should expose local addr: {err}"),
    };

    let status_line_owned = status_line.to_owned();
    let body_owned = body.to_owned();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut read_buf = [0_u8; 1024];
            let _ = socket.read(&mut read_buf).await;

            let response = format!(
                "HTTP/1.1 {status_line_owned}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body_owned}",
                body_owned.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{addr}/")
}

async fn checked_error(status_line: &str, body: &str) -> ProviderError {
    let url = serve_once(status_line, body).await;
    let response = match reqwest::get(url).await {
        Ok(response) => response,
        Err(err) => panic!("request should complete: {err}"),
    };
    match check_http_response(response).await {
        Ok(_) => panic!("response should fail on non-success status"),
        Err(err) => err,
    }
}

#[tokio::test]
async fn check_http_response_returns_body_on_success() {
    let url = serve_once("200 OK", "{\"ok\":true}").await;
    let response = reqwest::get(url).await.expect("request should complete");
    let body = check_http_response(response)
        .await
        .expect("2xx should pass through");
    assert_eq!(body, "{\"ok\":true}");
}

#[tokio::test]
async fn check_http_response_redacts_api_keys() {
    let raw_key = format!("sk-{}", "a1B2".repeat(10));
    let body = format!("{{\"error\": \"Incorrect API key provided: {raw_key}\"}}");

    match checked_error("401 Unauthorized", &body).await {
        ProviderError::HttpStatus { status, body } => {
            assert_eq!(status, 401);
            assert!(!body.contains(&raw_key));
            assert!(body.contains("[REDACTED]"));
        }
        other => panic!("expected http status error, got: {other}"),
    }
}

#[tokio::test]
async fn check_http_response_redacts_hub_tokens() {
    let raw_token = "hf_abcdefghijklmnopqrstuvwxyz1234";
    let body = format!("bad token={raw_token}");

    match checked_error("500 Internal Server Error", &body).await {
        ProviderError::HttpStatus { body, .. } => {
            assert!(!body.contains(raw_token));
            assert!(body.contains("[REDACTED]"));
        }
        other => panic!("expected http status error, got: {other}"),
    }
}

#[tokio::test]
async fn check_http_response_truncates_long_error_body() {
    let body = "x".repeat(400);

    match checked_error("429 Too Many Requests", &body).await {
        ProviderError::HttpStatus { status, body } => {
            assert_eq!(status, 429);
            assert!(body.ends_with("...[truncated]"));
        }
        other => panic!("expected http status error, got: {other}"),
    }
}
