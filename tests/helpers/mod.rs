#![allow(dead_code)]

use std::sync::Arc;

use open_skills::config::OpenSkillsConfig;
use open_skills::db::Database;
use open_skills::embedding::{ApiKey, EmbeddingClient, ProviderProfile, ProviderRegistry};
use open_skills::service::{router, AppState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STUB_PATH: &str = "/v1/embeddings";
pub const TEST_KEY: &str = "sk-test-secret";

/// Profile pointing at `server`, shaped like a real provider endpoint.
pub fn stub_profile(server: &MockServer, default_model: &str, dims: usize) -> ProviderProfile {
    ProviderProfile::new(format!("{}{STUB_PATH}", server.uri()), default_model, dims)
}

/// Embedding client whose registry maps each identifier to its stub server.
pub fn stub_client(entries: &[(&str, ProviderProfile)]) -> EmbeddingClient {
    let registry = ProviderRegistry::from_profiles(
        entries
            .iter()
            .map(|(id, profile)| (id.to_string(), profile.clone())),
    );
    EmbeddingClient::new(Arc::new(registry))
}

pub fn test_key() -> ApiKey {
    ApiKey::new(TEST_KEY)
}

/// Respond to every POST on the stub path with `data[0].embedding = embedding`.
pub async fn mount_embedding(server: &MockServer, embedding: &[f32]) {
    Mock::given(method("POST"))
        .and(path(STUB_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": embedding}],
        })))
        .mount(server)
        .await;
}

/// Serve the app on an ephemeral port and return its base URL.
pub async fn spawn_app(db: Database, embeddings: EmbeddingClient, config: OpenSkillsConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(db, embeddings, config));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
