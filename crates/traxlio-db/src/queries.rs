use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| query_value(conn, key))
    }

    pub fn put_value(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| upsert_value(conn, key, value))
    }

    /// Returns true if the key existed.
    pub fn delete_value(&self, key: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
            Ok(removed > 0)
        })
    }
}

pub(crate) fn query_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .optional()
}

pub(crate) fn upsert_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        (key, value),
    )?;
    Ok(())
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
