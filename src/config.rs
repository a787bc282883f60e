//! Service configuration loaded from TOML with environment overrides.
//!
//! Configuration feeds the service and CLI layers only. The embedding client
//! never reads it: credentials are looked up here and passed in per call.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::embedding::ApiKey;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpenSkillsConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Provider identifier to API key, e.g. `openai = "sk-..."`.
    pub credentials: HashMap<String, ApiKey>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub environment: String,
    /// Include internal error messages in HTTP error bodies.
    pub debug: bool,
    /// Origins allowed by CORS. `"*"` allows any origin without credentials.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

impl Default for OpenSkillsConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            credentials: HashMap::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            log_level: "info".into(),
            environment: "development".into(),
            debug: false,
            cors_origins: vec!["*".into()],
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_data_dir()
            .join("open-skills.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Returns `~/.open-skills/`, or `./.open-skills/` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".open-skills")
}

/// Returns the default config file path: `~/.open-skills/config.toml`
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

impl OpenSkillsConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            OpenSkillsConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// `OPEN_SKILLS_DB`, `OPEN_SKILLS_LOG_LEVEL`, `OPEN_SKILLS_HOST`,
    /// `OPEN_SKILLS_PORT` and `OPEN_SKILLS_ENVIRONMENT` replace their settings.
    /// `OPEN_SKILLS_CORS_ORIGINS` is a comma-separated origin list.
    /// Provider keys come from `<PROVIDER>_API_KEY` (e.g. `OPENAI_API_KEY`) or
    /// `OPEN_SKILLS_<PROVIDER>_API_KEY`, the latter winning.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("OPEN_SKILLS_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("OPEN_SKILLS_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("OPEN_SKILLS_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("OPEN_SKILLS_PORT") {
            self.server.port = val
                .parse()
                .with_context(|| format!("OPEN_SKILLS_PORT is not a valid port: {val}"))?;
        }
        if let Ok(val) = std::env::var("OPEN_SKILLS_ENVIRONMENT") {
            self.server.environment = val;
        }
        if let Ok(val) = std::env::var("OPEN_SKILLS_CORS_ORIGINS") {
            self.server.cors_origins = val
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }

        for provider in crate::embedding::providers::builtin_identifiers() {
            let upper = provider.to_ascii_uppercase();
            for var in [format!("{upper}_API_KEY"), format!("OPEN_SKILLS_{upper}_API_KEY")] {
                if let Ok(val) = std::env::var(&var) {
                    self.credentials.insert(provider.to_string(), ApiKey::new(val));
                }
            }
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// API key configured for `provider`, if any.
    pub fn credential(&self, provider: &str) -> Option<&ApiKey> {
        self.credentials.get(provider)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
