mod helpers;

use helpers::{mount_embedding, stub_client, stub_profile, test_key, STUB_PATH, TEST_KEY};
use open_skills::embedding::{ApiKey, EmbeddingError, ProviderProfile};
use serde_json::json;
use std::time::Duration;
use tokio::task::JoinSet;
use wiremock::matchers::{any, body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn returns_first_embedding_from_success_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STUB_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"embedding": [0.1, 0.2, 0.3]}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = stub_client(&[("openai", stub_profile(&server, "text-embedding-3-large", 3))]);
    let vector = client
        .generate("hello", "openai", &test_key(), None)
        .await
        .unwrap();

    assert_eq!(vector, vec![0.1f32, 0.2, 0.3]);
}

#[tokio::test]
async fn sends_bearer_token_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STUB_PATH))
        .and(header("authorization", format!("Bearer {TEST_KEY}").as_str()))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"input": "hello", "model": "mistral-embed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"embedding": [1.0]}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = stub_client(&[("mistral", stub_profile(&server, "mistral-embed", 1024))]);
    let vector = client
        .generate("hello", "mistral", &test_key(), None)
        .await
        .unwrap();

    assert_eq!(vector, vec![1.0]);
}

#[tokio::test]
async fn model_override_is_sent_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"input": "hello", "model": "Text-Embedding-3-Small "})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"embedding": [2.0]}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = stub_client(&[("openai", stub_profile(&server, "text-embedding-3-large", 1536))]);
    let vector = client
        .generate("hello", "openai", &test_key(), Some("Text-Embedding-3-Small "))
        .await
        .unwrap();

    assert_eq!(vector, vec![2.0]);
}

#[tokio::test]
async fn empty_text_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"input": "", "model": "stub-embed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"embedding": [0.0]}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = stub_client(&[("stub", stub_profile(&server, "stub-embed", 1))]);
    let vector = client.generate("", "stub", &test_key(), None).await.unwrap();
    assert_eq!(vector, vec![0.0]);
}

#[tokio::test]
async fn unsupported_provider_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = stub_client(&[
        ("openai", stub_profile(&server, "text-embedding-3-large", 1536)),
        ("mistral", stub_profile(&server, "mistral-embed", 1024)),
    ]);
    let err = client
        .generate("hello", "anthropic", &test_key(), None)
        .await
        .unwrap_err();

    match err {
        EmbeddingError::UnsupportedProvider {
            provider,
            supported,
        } => {
            assert_eq!(provider, "anthropic");
            assert_eq!(supported, vec!["mistral", "openai"]);
        }
        other => panic!("expected UnsupportedProvider, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_success_status_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid api key"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = stub_client(&[("openai", stub_profile(&server, "text-embedding-3-large", 1536))]);
    let err = client
        .generate("hello", "openai", &test_key(), None)
        .await
        .unwrap_err();

    match &err {
        EmbeddingError::Provider { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("expected Provider, got {other:?}"),
    }
    assert!(!err.to_string().contains(TEST_KEY));
}

#[tokio::test]
async fn error_status_with_embedding_shaped_body_is_still_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"data": [{"embedding": [0.1]}]})),
        )
        .mount(&server)
        .await;

    let client = stub_client(&[("stub", stub_profile(&server, "stub-embed", 1))]);
    let err = client
        .generate("hello", "stub", &test_key(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, EmbeddingError::Provider { status: 500, .. }));
}

#[tokio::test]
async fn unexpected_success_shape_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": "shape"})))
        .mount(&server)
        .await;

    let client = stub_client(&[("openai", stub_profile(&server, "text-embedding-3-large", 1536))]);
    let err = client
        .generate("hello", "openai", &test_key(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, EmbeddingError::MalformedResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn empty_data_array_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let client = stub_client(&[("stub", stub_profile(&server, "stub-embed", 1))]);
    let err = client
        .generate("hello", "stub", &test_key(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, EmbeddingError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let profile = ProviderProfile::new("http://127.0.0.1:1/v1/embeddings", "stub-embed", 1);
    let client = stub_client(&[("stub", profile)]);

    let err = client
        .generate("hello", "stub", &ApiKey::new("sk-unreachable"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, EmbeddingError::Transport(_)), "got {err:?}");
    assert!(!err.to_string().contains("sk-unreachable"));
}

#[tokio::test]
async fn dimensions_are_not_enforced() {
    let server = MockServer::start().await;
    mount_embedding(&server, &[0.5, 0.5]).await;

    // Profile claims 1536 dimensions; the two-element vector is still returned.
    let client = stub_client(&[("openai", stub_profile(&server, "text-embedding-3-large", 1536))]);
    let vector = client
        .generate("hello", "openai", &test_key(), None)
        .await
        .unwrap();

    assert_eq!(vector.len(), 2);
}

#[tokio::test]
async fn concurrent_calls_do_not_interfere() {
    let openai = MockServer::start().await;
    let mistral = MockServer::start().await;

    for (server, model, offset) in [
        (&openai, "text-embedding-3-large", 0.0f32),
        (&mistral, "mistral-embed", 100.0f32),
    ] {
        for (i, text) in ["alpha", "beta", "gamma"].into_iter().enumerate() {
            Mock::given(method("POST"))
                .and(body_partial_json(json!({"input": text, "model": model})))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": [{"embedding": [offset + i as f32, offset]}]
                })))
                .mount(server)
                .await;
        }
    }

    let client = stub_client(&[
        ("openai", stub_profile(&openai, "text-embedding-3-large", 1536)),
        ("mistral", stub_profile(&mistral, "mistral-embed", 1024)),
    ]);

    let mut tasks = JoinSet::new();
    for round in 0..4 {
        for (provider, offset) in [("openai", 0.0f32), ("mistral", 100.0f32)] {
            for (i, text) in ["alpha", "beta", "gamma"].into_iter().enumerate() {
                let client = client.clone();
                let key = test_key();
                tasks.spawn(async move {
                    let vector = client.generate(text, provider, &key, None).await.unwrap();
                    (round, provider, i, offset, vector)
                });
            }
        }
    }

    let mut completed = 0;
    while let Some(joined) = tasks.join_next().await {
        let (_round, provider, i, offset, vector) = joined.unwrap();
        assert_eq!(vector, vec![offset + i as f32, offset], "provider {provider}, text {i}");
        completed += 1;
    }
    assert_eq!(completed, 24);
}

#[tokio::test]
async fn cancelled_call_yields_no_vector_and_client_stays_usable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"input": "slow"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"embedding": [9.0]}]}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"input": "fast"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"embedding": [1.0]}]})))
        .mount(&server)
        .await;

    let client = stub_client(&[("stub", stub_profile(&server, "stub-embed", 1))]);
    let key = test_key();

    let cancelled = tokio::time::timeout(
        Duration::from_millis(200),
        client.generate("slow", "stub", &key, None),
    )
    .await;
    assert!(cancelled.is_err(), "expected cancellation, got {cancelled:?}");

    let vector = client.generate("fast", "stub", &key, None).await.unwrap();
    assert_eq!(vector, vec![1.0]);
}

