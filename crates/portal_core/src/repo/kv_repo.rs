//! Key-value store contract and SQLite implementation.
//!
//! # Responsibility
//! - Hold opaque string values under string keys, the way the portal
//!   front end used browser local storage.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `set_item` replaces any previous value for the key.
//! - `remove_item` on a missing key is a no-op.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for key-value persistence operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidKey(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "store connection is missing table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "store table `{table}` is missing column `{column}`")
            }
            Self::InvalidKey(key) => write!(f, "invalid store key: `{key}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key-value storage used for the portal document and session keys.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes `key` from the store.
    fn remove_item(&mut self, key: &str) -> StoreResult<()>;
}

/// SQLite-backed key-value store over the `kv_store` table.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Wraps a migrated connection, verifying the expected schema first.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Returns all stored keys in ascending order.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_store ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get("key")?);
        }
        Ok(keys)
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        debug!(
            "event=kv_set module=repo status=ok key={} bytes={}",
            key,
            value.len()
        );
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}

pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    if key.trim().is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    if !table_exists(conn, "kv_store")? {
        return Err(StoreError::MissingRequiredTable("kv_store"));
    }
    for column in ["key", "value", "updated_at"] {
        if !table_has_column(conn, "kv_store", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "kv_store",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, SqliteKeyValueStore, StoreError};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    #[test]
    fn set_item_overwrites_previous_value() {
        let conn = open_db_in_memory().unwrap();
        let mut store = SqliteKeyValueStore::try_new(&conn).unwrap();

        store.set_item("currentRole", "student").unwrap();
        store.set_item("currentRole", "teacher").unwrap();

        assert_eq!(
            store.get_item("currentRole").unwrap().as_deref(),
            Some("teacher")
        );
        assert_eq!(store.keys().unwrap(), vec!["currentRole".to_string()]);
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let conn = open_db_in_memory().unwrap();
        let mut store = SqliteKeyValueStore::try_new(&conn).unwrap();

        store.remove_item("currentUser").unwrap();
        assert!(store.get_item("currentUser").unwrap().is_none());
    }

    #[test]
    fn blank_key_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();

        let err = store.get_item("  ").unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteKeyValueStore::try_new(&conn)
            .err()
            .expect("bare connection has no kv_store table");
        assert!(matches!(err, StoreError::MissingRequiredTable("kv_store")));
    }
}
