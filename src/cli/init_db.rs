//! CLI `init-db` command: create or migrate the database.

use anyhow::Result;

use open_skills::config::OpenSkillsConfig;
use open_skills::db::Database;

pub async fn init_db(config: &OpenSkillsConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let db = Database::open(&db_path)?;

    let version = db.schema_version().await?;
    println!("Database:        {}", db_path.display());
    println!("Schema version:  {version}");

    db.dispose()
}
