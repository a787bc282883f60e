//! Skill and skill-version persistence.
//!
//! Every function takes a `&Connection` so it can run inside a
//! [`Database::session`](crate::db::Database::session) transaction.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::{NewSkillVersion, Skill, SkillVersion};
use super::SkillError;

const SKILL_COLUMNS: &str = "id, name, description, created_at, updated_at";
const VERSION_COLUMNS: &str = "id, skill_id, version, entrypoint, manifest, created_at";

/// Insert a new skill. Names are unique.
pub fn create_skill(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
) -> Result<Skill, SkillError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM skills WHERE name = ?1)",
        [name],
        |row| row.get(0),
    )?;
    if exists {
        return Err(SkillError::Conflict(format!("skill already exists: {name}")));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let skill = Skill {
        id: uuid::Uuid::now_v7().to_string(),
        name: name.to_string(),
        description: description.map(str::to_string),
        created_at: now.clone(),
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO skills (id, name, description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            skill.id,
            skill.name,
            skill.description,
            skill.created_at,
            skill.updated_at
        ],
    )?;

    tracing::info!(id = %skill.id, name = %skill.name, "skill created");
    Ok(skill)
}

pub fn get_skill(conn: &Connection, id: &str) -> Result<Skill, SkillError> {
    conn.query_row(
        &format!("SELECT {SKILL_COLUMNS} FROM skills WHERE id = ?1"),
        [id],
        skill_from_row,
    )
    .optional()?
    .ok_or_else(|| SkillError::NotFound(format!("skill not found: {id}")))
}

/// All skills ordered by name.
pub fn list_skills(conn: &Connection) -> Result<Vec<Skill>, SkillError> {
    let mut stmt = conn.prepare(&format!("SELECT {SKILL_COLUMNS} FROM skills ORDER BY name"))?;
    let skills = stmt
        .query_map([], skill_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(skills)
}

/// Publish an immutable version of `skill_id` and bump the skill's `updated_at`.
pub fn publish_version(
    conn: &Connection,
    skill_id: &str,
    new: &NewSkillVersion,
) -> Result<SkillVersion, SkillError> {
    get_skill(conn, skill_id)?;

    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM skill_versions WHERE skill_id = ?1 AND version = ?2)",
        params![skill_id, new.version],
        |row| row.get(0),
    )?;
    if exists {
        return Err(SkillError::Conflict(format!(
            "version {} already published for skill {skill_id}",
            new.version
        )));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let version = SkillVersion {
        id: uuid::Uuid::now_v7().to_string(),
        skill_id: skill_id.to_string(),
        version: new.version.clone(),
        entrypoint: new.entrypoint.clone(),
        manifest: new.manifest.clone(),
        created_at: now.clone(),
    };

    conn.execute(
        "INSERT INTO skill_versions (id, skill_id, version, entrypoint, manifest, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            version.id,
            version.skill_id,
            version.version,
            version.entrypoint,
            version.manifest.to_string(),
            version.created_at
        ],
    )?;
    conn.execute(
        "UPDATE skills SET updated_at = ?1 WHERE id = ?2",
        params![now, skill_id],
    )?;

    tracing::info!(skill_id, version = %version.version, "skill version published");
    Ok(version)
}

/// Versions of `skill_id`, newest first.
pub fn list_versions(conn: &Connection, skill_id: &str) -> Result<Vec<SkillVersion>, SkillError> {
    get_skill(conn, skill_id)?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {VERSION_COLUMNS} FROM skill_versions
         WHERE skill_id = ?1 ORDER BY created_at DESC, id DESC"
    ))?;
    let versions = stmt
        .query_map([skill_id], version_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(versions)
}

fn skill_from_row(row: &Row<'_>) -> rusqlite::Result<Skill> {
    Ok(Skill {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn version_from_row(row: &Row<'_>) -> rusqlite::Result<SkillVersion> {
    let manifest: String = row.get(4)?;
    Ok(SkillVersion {
        id: row.get(0)?,
        skill_id: row.get(1)?,
        version: row.get(2)?,
        entrypoint: row.get(3)?,
        manifest: serde_json::from_str(&manifest).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: row.get(5)?,
    })
}
