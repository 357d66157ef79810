//! Model registry, current model, and connectivity probe against the mock backend.

mod common;

use agentcfg::backend::{ApiResponse, BackendClient, SyncError};
use agentcfg::model_config::ModelConfig;
use common::{deepseek, spawn_backend, unreachable_url};

#[tokio::test]
async fn fetch_on_empty_backend_seeds_and_echoes() {
    let backend = spawn_backend().await;
    let client = BackendClient::new(Some(backend.url.clone()));

    let seeds = vec![deepseek(""), ModelConfig::new("Qwen", "qwen3", "https://q", "")];
    let got = client.fetch_model_configs(&seeds).await.expect("fetch");
    assert_eq!(got, seeds);

    // Once seeded, later candidates are ignored.
    let got = client
        .fetch_model_configs(&[deepseek("other")])
        .await
        .expect("fetch");
    assert_eq!(got, seeds);
}

#[tokio::test]
async fn fetch_empty_candidates_returns_empty_list() {
    let backend = spawn_backend().await;
    let client = BackendClient::new(Some(backend.url.clone()));
    let got = client.fetch_registry().await.expect("fetch");
    assert!(got.is_empty());
}

#[tokio::test]
async fn save_then_fetch_round_trips() {
    let backend = spawn_backend().await;
    let client = BackendClient::new(Some(backend.url.clone()));
    client.ensure_seeded(&[deepseek("")]).await.expect("seed");

    let list = vec![
        deepseek("sk-x"),
        ModelConfig::new("Moonshot", "kimi-k2-0711-preview", "https://api.moonshot.cn/v1", "sk-m"),
    ];
    let msg = client.save_model_configs(&list).await.expect("save");
    assert_eq!(msg, "Model configuration saved");

    let got = client
        .fetch_model_configs(&[ModelConfig::new("ignored", "i", "https://i", "k")])
        .await
        .expect("fetch");
    assert_eq!(got, list);
}

#[tokio::test]
async fn save_with_incomplete_entry_sends_nothing() {
    let backend = spawn_backend().await;
    let client = BackendClient::new(Some(backend.url.clone()));
    let err = client
        .save_model_configs(&[deepseek("sk-x"), deepseek("")])
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvalidInput(_)));
    assert!(err.error().contains("api_key"));
    assert_eq!(backend.count("/set_model_config"), 0);
}

#[tokio::test]
async fn set_and_get_current_model() {
    let backend = spawn_backend().await;
    let client = BackendClient::new(Some(backend.url.clone()));

    assert_eq!(client.get_current_model().await.expect("get"), None);

    client.save_model_configs(&[deepseek("sk-x")]).await.expect("save");
    let msg = client.set_current_model("DeepSeek").await.expect("set");
    assert!(!msg.is_empty());
    assert_eq!(
        client.get_current_model().await.expect("get").as_deref(),
        Some("DeepSeek")
    );
    let queries = backend.state.lock().unwrap().queries.clone();
    assert_eq!(queries, ["model_name=DeepSeek"]);
}

#[tokio::test]
async fn current_model_name_is_url_encoded() {
    let backend = spawn_backend().await;
    let client = BackendClient::new(Some(backend.url.clone()));
    client.set_current_model("My Model&Co").await.expect("set");
    let queries = backend.state.lock().unwrap().queries.clone();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].starts_with("model_name=My"));
    assert!(queries[0].contains("%26Co"));
}

#[tokio::test]
async fn empty_model_name_is_rejected_locally() {
    let backend = spawn_backend().await;
    let client = BackendClient::new(Some(backend.url.clone()));
    assert!(matches!(
        client.set_current_model("  ").await,
        Err(SyncError::InvalidInput(_))
    ));
    assert!(backend.hits().is_empty());
}

#[tokio::test]
async fn connectivity_success() {
    let backend = spawn_backend().await;
    let client = BackendClient::new(Some(backend.url.clone()));
    let msg = client.check_connectivity(&deepseek("sk-good")).await.expect("probe");
    assert_eq!(msg, "DeepSeek is reachable");
}

#[tokio::test]
async fn connectivity_rejection_in_200_body_is_an_error() {
    let backend = spawn_backend().await;
    let client = BackendClient::new(Some(backend.url.clone()));
    let result = client.check_connectivity(&deepseek("sk-bad-key")).await;
    let err = result.as_ref().unwrap_err();
    assert!(matches!(err, SyncError::Rejected(_)));
    assert!(!err.is_transport());

    let envelope: ApiResponse<String> = result.into();
    assert!(envelope.data.is_none());
    assert_eq!(
        envelope.error.as_deref(),
        Some("Authentication failed: invalid api key")
    );
}

#[tokio::test]
async fn connectivity_transport_failure_is_distinct() {
    let client = BackendClient::new(Some(unreachable_url()));
    let err = client.check_connectivity(&deepseek("sk-good")).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.error(), "Network error");
}

#[tokio::test]
async fn connectivity_requires_complete_config() {
    let backend = spawn_backend().await;
    let client = BackendClient::new(Some(backend.url.clone()));
    let err = client.check_connectivity(&deepseek("")).await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidInput(_)));
    assert_eq!(backend.count("/check_model_connectivity"), 0);
}
