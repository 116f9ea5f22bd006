pub mod migrations;
pub mod queries;
pub mod store;

pub use store::{
    INVENTORY_KEY, LocalStore, SETTINGS_FREQUENCY_KEY, SETTINGS_NOTIFICATIONS_KEY,
};

use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Where the local store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageScope {
    /// Durable SQLite file.
    Persistent(PathBuf),
    /// In-memory database that lives as long as the store handle (demo mode).
    Session,
}

impl StorageScope {
    pub fn from_demo_flag(demo_mode: bool, path: impl Into<PathBuf>) -> Self {
        if demo_mode {
            Self::Session
        } else {
            Self::Persistent(path.into())
        }
    }
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(scope: &StorageScope) -> Result<Self> {
        match scope {
            StorageScope::Persistent(path) => Self::open_file(path),
            StorageScope::Session => Self::open_session(),
        }
    }

    fn open_file(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent readers in other processes
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Local store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_session() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;

        info!("Session store opened (in memory)");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` while holding the connection lock. Everything inside one call
    /// is serialized against other callers of the same handle.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}
