//! Completion client and content fetcher against mock HTTP servers

use seocore_engine::config::LLMConfig;
use seocore_engine::fetcher::{ContentFetcher, HttpContentFetcher};
use seocore_engine::llm::openai::OpenAIClient;
use seocore_engine::llm::{CompletionClient, LLMError, Message};
use seocore_engine::secrets::SecretString;
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn client_for(server: &MockServer) -> OpenAIClient {
    let config = LLMConfig {
        base_url: format!("{}/v1", server.uri()),
        ..LLMConfig::default()
    };
    OpenAIClient::from_config(&config, SecretString::new("test-key")).unwrap()
}

#[tokio::test]
async fn test_completion_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 1200,
            "messages": [
                {"role": "system", "content": "check titles"},
                {"role": "user", "content": "https://example.com"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "Titles look fine."}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let answer = client
        .complete(
            &[
                Message::system("check titles"),
                Message::user("https://example.com"),
            ],
            "gpt-3.5-turbo",
        )
        .await
        .unwrap();

    assert_eq!(answer, "Titles look fine.");
}

#[tokio::test]
async fn test_completion_maps_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(&[Message::user("hi")], "gpt-3.5-turbo")
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::AuthenticationFailed(_)));
}

#[tokio::test]
async fn test_completion_maps_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(&[Message::user("hi")], "gpt-3.5-turbo")
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::RateLimitExceeded));
}

#[tokio::test]
async fn test_completion_times_out_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": [{"message": {"content": "late"}}]}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = LLMConfig {
        base_url: format!("{}/v1", server.uri()),
        request_timeout_secs: Some(1),
        ..LLMConfig::default()
    };
    let client = OpenAIClient::from_config(&config, SecretString::new("test-key")).unwrap();

    let err = client
        .complete(&[Message::user("hi")], "gpt-3.5-turbo")
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::Timeout));
}

#[tokio::test]
async fn test_fetcher_returns_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>Coffee</title>"))
        .mount(&server)
        .await;

    let fetcher = HttpContentFetcher::default();
    let body = fetcher.fetch(&format!("{}/shop", server.uri())).await;
    assert_eq!(body, "<title>Coffee</title>");
}

#[tokio::test]
async fn test_fetcher_describes_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = HttpContentFetcher::new(Duration::from_secs(2));
    let body = fetcher.fetch(&server.uri()).await;
    assert!(body.starts_with("[content fetch failed:"));
    assert!(body.contains("500"));
}

#[tokio::test]
async fn test_fetcher_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let fetcher = HttpContentFetcher::new(Duration::from_millis(200));
    let body = fetcher.fetch(&server.uri()).await;
    assert!(body.starts_with("[content fetch failed:"));
}
