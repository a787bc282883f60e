//! SQLite database handle with transaction-scoped sessions.
//!
//! A [`Database`] is opened once at startup and passed to whoever needs it.
//! Every unit of work runs through [`Database::session`], which takes the
//! connection on the blocking pool, wraps the work in a transaction, commits
//! on `Ok` and rolls back on `Err`.

pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection lock poisoned")]
    LockPoisoned,

    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Owned handle to the service database. Clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

impl Database {
    /// Open (or create) the database at `path` with schema and migrations applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;

        let db = Self::initialize(conn, Some(path.to_path_buf()))?;
        tracing::info!(path = %path.display(), "database initialized");
        Ok(db)
    }

    /// Open a private in-memory database, fully initialized.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::initialize(conn, None)
    }

    fn initialize(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::init_schema(&conn).context("failed to initialize schema")?;
        migrations::run_migrations(&conn).context("failed to run migrations")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// On-disk location, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `work` inside one transaction on the blocking pool.
    ///
    /// The transaction commits if `work` returns `Ok` and rolls back otherwise.
    /// The connection is released before this future resolves.
    pub async fn session<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DbError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let joined = tokio::task::spawn_blocking(move || -> Result<T, E> {
            let mut guard = conn.lock().map_err(|_| DbError::LockPoisoned)?;
            let tx = guard.transaction().map_err(DbError::from)?;
            let value = work(&tx)?;
            tx.commit().map_err(DbError::from)?;
            Ok(value)
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(e) => Err(DbError::from(e).into()),
        }
    }

    /// Current schema version, read through a session.
    pub async fn schema_version(&self) -> Result<u32, DbError> {
        self.session(|tx| migrations::get_schema_version(tx).map_err(DbError::from))
            .await
    }

    /// Close the connection if this is the last handle.
    pub fn dispose(self) -> Result<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex.into_inner().map_err(|_| DbError::LockPoisoned)?;
                conn.close()
                    .map_err(|(_, e)| e)
                    .context("failed to close database")?;
                tracing::info!("database closed");
            }
            Err(_) => {
                tracing::debug!("database handle still shared, closing with last owner");
            }
        }
        Ok(())
    }
}
