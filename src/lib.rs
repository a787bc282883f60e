//! Versioned skill registry with provider-agnostic text embeddings.
//!
//! open-skills stores skills and their published versions in SQLite and can
//! turn text into embedding vectors through any provider in its registry:
//!
//! | Provider | Default model | Dimensions |
//! |----------|---------------|------------|
//! | `openai` | `text-embedding-3-large` | 1536 |
//! | `mistral` | `mistral-embed` | 1024 |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`embedding`]: Provider registry and the embedding client
//! - [`db`]: SQLite handle, schema, migrations, and transaction-scoped sessions
//! - [`skills`]: Skill and skill-version records
//! - [`service`]: axum HTTP service

pub mod config;
pub mod db;
pub mod embedding;
pub mod service;
pub mod skills;
