pub mod store;
pub mod types;

use thiserror::Error;

use crate::db::DbError;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<rusqlite::Error> for SkillError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(DbError::Sqlite(e))
    }
}
