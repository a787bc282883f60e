//! Text-to-vector embedding via remote providers.
//!
//! [`EmbeddingClient::generate`] resolves a provider in the
//! [`ProviderRegistry`], sends one authenticated request, and returns the
//! vector the provider produced. The client reads no configuration: the text,
//! provider, credential and optional model all arrive as call arguments.

pub mod providers;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub use providers::{ProviderProfile, ProviderRegistry};

/// Wall-clock limit for one provider round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque provider credential, sent as a bearer token.
///
/// Has no `Display` and a redacted `Debug`, so it cannot end up in a log line
/// or error message by accident.
pub struct ApiKey(Secret<String>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Secret::new(key.into()))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Failures from [`EmbeddingClient::generate`].
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The identifier is not in the registry. No request was sent.
    #[error("unsupported provider: {provider}. Supported: {}", .supported.join(", "))]
    UnsupportedProvider {
        provider: String,
        supported: Vec<String>,
    },

    /// The provider answered with a non-success status.
    #[error("embedding provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    /// The provider answered 2xx but the body had no `data[0].embedding`.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),

    /// Connection, DNS, TLS or timeout failure.
    #[error("embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Stateless embedding client over a shared, read-only provider registry.
///
/// Cheap to clone. Each [`generate`](Self::generate) call builds and drops its
/// own HTTP client, so concurrent calls share nothing mutable. Dropping the
/// returned future abandons the in-flight request.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    registry: Arc<ProviderRegistry>,
    timeout: Duration,
}

impl EmbeddingClient {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            timeout: REQUEST_TIMEOUT,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Embed `text` with `provider`, using `model` or the provider's default.
    ///
    /// Components are narrowed to `f32`, so values carrying more precision than
    /// that come back rounded (`0.123456789` becomes `0.12345679`).
    pub async fn generate(
        &self,
        text: &str,
        provider: &str,
        credential: &ApiKey,
        model: Option<&str>,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let profile = self.registry.lookup(provider)?;
        let model = model.unwrap_or(profile.default_model.as_str());

        tracing::debug!(
            provider,
            model,
            text_len = text.len(),
            "requesting embedding"
        );

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let response = client
            .post(&profile.endpoint)
            .bearer_auth(credential.expose())
            .json(&EmbeddingRequest { input: text, model })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(provider, status = status.as_u16(), "embedding provider error");
            return Err(EmbeddingError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let embedding = extract_embedding(&body)?;

        if model == profile.default_model && embedding.len() != profile.default_dimensions {
            tracing::debug!(
                provider,
                expected = profile.default_dimensions,
                actual = embedding.len(),
                "embedding length differs from provider default"
            );
        }

        tracing::debug!(provider, dimensions = embedding.len(), "embedding received");
        Ok(embedding)
    }
}

/// Pull `data[0].embedding` out of a success body.
fn extract_embedding(body: &str) -> Result<Vec<f32>, EmbeddingError> {
    let parsed: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| EmbeddingError::MalformedResponse(e.to_string()))?;

    parsed
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| EmbeddingError::MalformedResponse("`data` array is empty".into()))
}
