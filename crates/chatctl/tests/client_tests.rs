//! ChatdClient against a real chatd router on a loopback port.

use chat_common::{
    AnswerSource, FakeLlmClient, FallbackConfig, FallbackService, FaqStore, VaguenessClassifier,
};
use chatctl::ChatdClient;
use chatd::config::ServerConfig;
use chatd::server::{self, AppState};
use std::sync::Arc;
use tempfile::TempDir;

async fn spawn_chatd(dir: &TempDir, llm: FakeLlmClient) -> String {
    let state = AppState::new(
        Arc::new(FaqStore::open(dir.path().join("faq.json"))),
        Arc::new(llm),
        Arc::new(FallbackService::open(&FallbackConfig::default())),
        VaguenessClassifier::default(),
    );
    let app = server::router(state, &ServerConfig::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_client_round_trip() {
    let dir = TempDir::new().unwrap();
    let url = spawn_chatd(&dir, FakeLlmClient::unavailable()).await;
    let client = ChatdClient::new(&url).unwrap();

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");

    assert_eq!(client.list_faqs().await.unwrap().count, 0);

    let added = client
        .add_faq("What are your hours?", "9am to 5pm.")
        .await
        .unwrap();
    assert_eq!(added.message, "FAQ added successfully");

    let resp = client.ask("what are your hours?").await.unwrap();
    assert_eq!(resp.source, AnswerSource::Faq);
    assert_eq!(resp.response, "9am to 5pm.");

    let resp = client.ask("Something nobody knows").await.unwrap();
    assert!(resp.is_fallback());

    let logs = client.logs(Some(5)).await.unwrap();
    assert_eq!(logs.count, 1);
    assert_eq!(logs.logs[0].message, "Something nobody knows");

    let reloaded = client.reload_faqs().await.unwrap();
    assert_eq!(reloaded.count, Some(1));
}

#[tokio::test]
async fn test_client_surfaces_error_detail() {
    let dir = TempDir::new().unwrap();
    let url = spawn_chatd(&dir, FakeLlmClient::unavailable()).await;
    let client = ChatdClient::new(&url).unwrap();

    let err = client.ask("   ").await.unwrap_err();
    assert_eq!(err.to_string(), "chatd returned 400: Message cannot be empty");
}

#[tokio::test]
async fn test_client_unreachable_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ChatdClient::new(&format!("http://{}", addr)).unwrap();
    let err = client.health().await.unwrap_err();
    assert!(err.to_string().starts_with("Cannot reach chatd"));
}
