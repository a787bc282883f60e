//! CLI `embed` command: embed one piece of text and print the vector.

use anyhow::{Context, Result};
use std::sync::Arc;

use open_skills::config::OpenSkillsConfig;
use open_skills::embedding::{EmbeddingClient, ProviderRegistry};

/// Embed `text` with `provider` using the configured credential.
pub async fn embed(
    config: &OpenSkillsConfig,
    text: &str,
    provider: &str,
    model: Option<&str>,
) -> Result<()> {
    let client = EmbeddingClient::new(Arc::new(ProviderRegistry::builtin()));

    // Reject unknown providers before complaining about credentials.
    client.registry().lookup(provider)?;

    let credential = config.credential(provider).with_context(|| {
        format!(
            "no credential for {provider}: set {}_API_KEY or add it under [credentials]",
            provider.to_ascii_uppercase()
        )
    })?;

    let embedding = client.generate(text, provider, credential, model).await?;

    println!("{}", serde_json::to_string(&embedding)?);
    eprintln!("{} dimensions", embedding.len());
    Ok(())
}
