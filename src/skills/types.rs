//! Skill record types.

use serde::{Deserialize, Serialize};

/// A named skill, matching the `skills` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    /// Unique, human-chosen name.
    pub name: String,
    pub description: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last change, including publishing a version.
    pub updated_at: String,
}

/// One immutable published version of a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillVersion {
    pub id: String,
    pub skill_id: String,
    /// Version label, unique per skill (e.g. `"1.2.0"`).
    pub version: String,
    /// Script or module the runner invokes.
    pub entrypoint: String,
    /// Arbitrary JSON manifest (inputs, outputs, tags).
    pub manifest: serde_json::Value,
    pub created_at: String,
}

/// Fields needed to publish a version.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSkillVersion {
    pub version: String,
    pub entrypoint: String,
    #[serde(default = "empty_manifest")]
    pub manifest: serde_json::Value,
}

fn empty_manifest() -> serde_json::Value {
    serde_json::json!({})
}
