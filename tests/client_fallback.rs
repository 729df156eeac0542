//! The caller-side path always yields a suggestion.

use fusion_gateway::client::{ClientMode, SuggestionClient};
use fusion_gateway::models::FusionContext;
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

#[tokio::test]
async fn backend_failure_falls_back_to_local_rules() {
    let mut server = Server::new_async().await;
    let backend = server
        .mock("POST", "/api/fuse/suggest")
        .with_status(500)
        .with_body(r#"{"error":"Proxy failed"}"#)
        .create_async()
        .await;

    let client = SuggestionClient::new(ClientMode::Backend { url: server.url() });
    let res = client.suggest("A", "B", &FusionContext::default()).await;

    assert_eq!(res.provider, "local");
    assert_eq!(res.title, "A × B");
    assert!(res.notes.contains('A') && res.notes.contains('B'));
    backend.assert_async().await;
}

#[tokio::test]
async fn backend_result_keeps_its_provider_tag() {
    let mut server = Server::new_async().await;
    let backend = server
        .mock("POST", "/api/fuse/suggest")
        .match_body(Matcher::PartialJson(json!({ "a": "A", "b": "B" })))
        .with_status(200)
        .with_body(r#"{"title":"AB","notes":"n","provider":"proxy-cache","language":"zh"}"#)
        .create_async()
        .await;

    let client = SuggestionClient::new(ClientMode::Backend {
        url: format!("{}/", server.url()),
    });
    let res = client.suggest("A", "B", &FusionContext::default()).await;

    assert_eq!(res.provider, "proxy-cache");
    assert_eq!(res.title, "AB");
    backend.assert_async().await;
}

#[tokio::test]
async fn backend_without_provider_tag_is_reported_as_api() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/fuse/suggest")
        .with_status(200)
        .with_body(r#"{"title":"AB","notes":"n"}"#)
        .create_async()
        .await;

    let client = SuggestionClient::new(ClientMode::Backend { url: server.url() });
    let res = client.suggest("A", "B", &FusionContext::default()).await;
    assert_eq!(res.provider, "api");
}

#[tokio::test]
async fn direct_call_normalizes_fenced_reply() {
    let mut server = Server::new_async().await;
    let content = "```json\n{\"title\":\"茶旅\",\"notes\":[\"卖点：山里喝茶\",],}\n```";
    let provider = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-user")
        .match_body(Matcher::PartialJson(json!({ "model": "deepseek-chat" })))
        .with_status(200)
        .with_body(json!({ "choices": [{ "message": { "content": content } }] }).to_string())
        .create_async()
        .await;

    let client = SuggestionClient::new(ClientMode::Direct {
        api_key: "sk-user".into(),
        base_url: server.url(),
    });
    let res = client.suggest("茶", "露营", &FusionContext::default()).await;

    assert_eq!(res.provider, "deepseek");
    assert_eq!(res.title, "茶旅");
    assert_eq!(res.notes, "卖点：山里喝茶");
    provider.assert_async().await;
}

#[tokio::test]
async fn direct_call_with_unusable_body_falls_back() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body("<html>gateway timeout</html>")
        .create_async()
        .await;

    let client = SuggestionClient::new(ClientMode::Direct {
        api_key: "sk-user".into(),
        base_url: server.url(),
    });
    let res = client.suggest("A", "B", &FusionContext::default()).await;
    assert_eq!(res.provider, "local");
    assert_eq!(res.title, "A × B");
}

#[tokio::test]
async fn direct_call_with_rejected_key_falls_back() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .create_async()
        .await;

    let client = SuggestionClient::new(ClientMode::Direct {
        api_key: "bad".into(),
        base_url: server.url(),
    });
    let ctx = FusionContext {
        language: Some("en".into()),
        ..Default::default()
    };
    let res = client.suggest("A", "B", &ctx).await;
    assert_eq!(res.provider, "local");
    assert_eq!(res.language, "en");
}

// Accepts connections and never answers
async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn hung_backend_is_abandoned_at_the_timeout_floor() {
    let client = SuggestionClient::new(ClientMode::Backend {
        url: silent_server().await,
    });
    let ctx = FusionContext {
        timeout_ms: Some(1_000),
        ..Default::default()
    };

    let started = Instant::now();
    let res = client.suggest("A", "B", &ctx).await;
    let elapsed = started.elapsed();

    assert_eq!(res.provider, "local");
    assert_eq!(res.title, "A × B");
    assert!(elapsed >= Duration::from_secs(8), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(9), "{elapsed:?}");
}

#[tokio::test]
async fn hung_provider_falls_back_to_local_rules() {
    let client = SuggestionClient::new(ClientMode::Direct {
        api_key: "sk-user".into(),
        base_url: silent_server().await,
    });
    let ctx = FusionContext {
        timeout_ms: Some(8_500),
        language: Some("en".into()),
        ..Default::default()
    };

    let started = Instant::now();
    let res = client.suggest("A", "B", &ctx).await;

    assert_eq!(res.provider, "local");
    assert_eq!(res.language, "en");
    assert!(started.elapsed() < Duration::from_secs(10));
}
