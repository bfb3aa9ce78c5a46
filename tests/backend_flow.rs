//! End-to-end flows against a mocked document service

use resumo::config::ApiConfig;
use resumo::error::{MSG_SERVER_ERROR, MSG_UNKNOWN};
use resumo::hooks::{KeywordsHook, SummarizeHook};
use resumo::{
    ApiClient, Config, FileUpload, HealthPoller, HealthStatus, OverlapPolicy, SummaryType,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let mut config = Config::default();
    config.apply_env(|key| match key {
        "RESUMO_API_URL" => Some(server.uri()),
        "RESUMO_API_TIMEOUT" => Some("5000".to_string()),
        _ => None,
    });
    assert_eq!(
        config.api,
        ApiConfig {
            base_url: server.uri(),
            timeout_ms: 5000
        }
    );
    ApiClient::new(&config.api).unwrap()
}

#[tokio::test]
async fn summarize_then_reset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "summary": "- point one\n- point two",
            "summary_type": "bullets",
            "original_filename": "minutes.docx",
            "length_original": 4000,
            "length_summary": 1000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let hook = SummarizeHook::new(client_for(&server), OverlapPolicy::default());
    let file = FileUpload::new("minutes.docx", b"PK\x03\x04".to_vec());
    let summary = hook
        .summarize(Some(file), SummaryType::Bullets, 4096)
        .await
        .unwrap();

    assert_eq!(summary.original_filename, "minutes.docx");
    assert_eq!(summary.reduction_percentage(), 75.0);
    assert_eq!(hook.state().result, Some(summary));

    hook.reset();
    let state = hook.state();
    assert!(state.result.is_none() && state.error.is_none() && !state.is_loading);
}

#[tokio::test]
async fn error_then_retry_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract-keywords"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/extract-keywords"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "- rust"})),
        )
        .mount(&server)
        .await;

    let hook = KeywordsHook::new(client_for(&server), OverlapPolicy::default());
    let text = || Some("Rust is a systems programming language.".to_string());

    assert!(hook.extract(text(), None).await.is_err());
    assert_eq!(hook.state().error.as_deref(), Some(MSG_SERVER_ERROR));

    assert_eq!(hook.extract(text(), None).await.unwrap(), "- rust");
    assert!(hook.state().error.is_none());
}

#[tokio::test]
async fn unmapped_status_reaches_hook_as_unknown_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let hook = KeywordsHook::new(client_for(&server), OverlapPolicy::default());
    hook.extract(Some("some text".into()), None).await.unwrap_err();
    assert_eq!(hook.state().error.as_deref(), Some(MSG_UNKNOWN));
}

#[tokio::test]
async fn poller_reports_online_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ok": true, "service": "backend"})),
        )
        .mount(&server)
        .await;

    let handle = HealthPoller::start(Arc::new(client_for(&server)), Duration::from_secs(30));
    let mut status = handle.subscribe();
    assert_eq!(*status.borrow_and_update(), HealthStatus::Checking);

    tokio::time::timeout(Duration::from_secs(5), status.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(handle.status(), HealthStatus::Online);

    handle.shutdown().await;
}
