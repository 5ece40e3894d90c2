//! SQLite implementation of the StorageProvider trait.
//!
//! This is the persistent backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via `tokio::task::spawn_blocking`. Reads and writes are
//! bounded by `tokio::time::timeout`.

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{Priority, StorageProvider};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&conn)
        })
        .await?
    }

    /// Like [`with_conn`](Self::with_conn), failing with `Timeout` after `limit`.
    ///
    /// A timed-out statement keeps running on its worker thread; only the
    /// caller stops waiting.
    async fn with_conn_timeout<F, T>(&self, op: &'static str, limit: Duration, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        bounded(op, limit, self.with_conn(f)).await
    }
}

async fn bounded<T>(op: &'static str, limit: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(op, ?limit, "store operation timed out");
            Err(StoreError::Timeout(limit))
        }
    }
}

#[async_trait]
impl StorageProvider for SqliteStore {
    async fn read(&self, key: &[u8], timeout: Duration) -> Result<Option<Bytes>> {
        let key = key.to_vec();
        self.with_conn_timeout("read", timeout, move |conn| {
            let value: Option<Vec<u8>> = conn
                .query_row("SELECT value FROM entries WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value.map(Bytes::from))
        })
        .await
    }

    async fn write(
        &self,
        key: &[u8],
        value: &[u8],
        priority: Priority,
        overwrite: bool,
        timeout: Duration,
    ) -> Result<()> {
        let key = key.to_vec();
        let value = value.to_vec();
        self.with_conn_timeout("write", timeout, move |conn| {
            let now = migration::now_millis();
            if overwrite {
                conn.execute(
                    "INSERT INTO entries (key, value, priority, written_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        priority = excluded.priority,
                        written_at = excluded.written_at",
                    params![key, value, priority.as_u8(), now],
                )?;
            } else {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO entries (key, value, priority, written_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![key, value, priority.as_u8(), now],
                )?;
                if inserted == 0 {
                    return Err(StoreError::KeyExists(key));
                }
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        let key = key.to_vec();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM entries WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }

    async fn contains_key(&self, key: &[u8]) -> Result<bool> {
        let key = key.to_vec();
        self.with_conn(move |conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM entries WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn get_all_keys(&self) -> Result<Vec<Bytes>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM entries ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, Vec<u8>>(0))?
                .map(|r| r.map(Bytes::from))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(keys)
        })
        .await
    }
}
