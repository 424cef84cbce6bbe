//! Fallback chains over real HTTP clients against mock servers.

use reqwest::Client;
use serde_json::json;
use temper_llm::{FallbackChain, LlmClient, LlmError, LlmProvider, LlmRequest, TextGenerator};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(name: &str, server: &MockServer) -> LlmClient {
    LlmClient::new(
        name,
        LlmProvider::OpenAiCompatible {
            base_url: format!("{}/v1", server.uri()),
            api_key: "test-key".into(),
        },
        "small",
        "large",
        0,
    )
    .with_http_client(Client::builder().no_proxy().build().expect("http client"))
}

async fn serve(server: &MockServer, body: serde_json::Value, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn empty_success_falls_through_to_secondary() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;
    serve(&primary, json!({}), 1).await;
    serve(
        &secondary,
        json!({ "choices": [{ "message": { "content": "Give me a date." } }] }),
        1,
    )
    .await;

    let chain = FallbackChain::new(vec![
        Box::new(client("primary", &primary)),
        Box::new(client("secondary", &secondary)),
    ]);
    let response = chain.generate(&LlmRequest::reply("s", "u")).await.expect("secondary answers");

    assert_eq!(response.text, "Give me a date.");
}

#[tokio::test]
async fn healthy_primary_is_the_only_provider_called() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;
    serve(
        &primary,
        json!({ "choices": [{ "message": { "content": "Fine." } }] }),
        1,
    )
    .await;
    serve(&secondary, json!({}), 0).await;

    let chain = FallbackChain::new(vec![
        Box::new(client("primary", &primary)),
        Box::new(client("secondary", &secondary)),
    ]);
    let response = chain.generate(&LlmRequest::reply("s", "u")).await.expect("primary answers");

    assert_eq!(response.text, "Fine.");
}

#[tokio::test]
async fn chain_fails_when_every_provider_returns_nothing() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;
    serve(&primary, json!({}), 1).await;
    serve(&secondary, json!({ "choices": [] }), 1).await;

    let chain = FallbackChain::new(vec![
        Box::new(client("primary", &primary)),
        Box::new(client("secondary", &secondary)),
    ]);
    let err = chain.generate(&LlmRequest::reply("s", "u")).await.expect_err("nothing usable");

    assert!(matches!(err, LlmError::AllProvidersFailed { providers: 2, .. }));
}
