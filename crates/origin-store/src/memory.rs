//! In-memory implementation of the StorageProvider trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence. Operations complete
//! immediately, so timeouts never fire.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::{Priority, StorageProvider};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<BTreeMap<Bytes, Entry>>,
}

#[derive(Debug, Clone)]
struct Entry {
    value: Bytes,
    priority: Priority,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read_guard()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read_guard()?.is_empty())
    }

    /// Priority the value at `key` was last written with.
    pub fn priority_of(&self, key: &[u8]) -> Result<Option<Priority>> {
        Ok(self.read_guard()?.get(key).map(|e| e.priority))
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, BTreeMap<Bytes, Entry>>> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<Bytes, Entry>>> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }
}

#[async_trait]
impl StorageProvider for MemoryStore {
    async fn read(&self, key: &[u8], _timeout: Duration) -> Result<Option<Bytes>> {
        Ok(self.read_guard()?.get(key).map(|e| e.value.clone()))
    }

    async fn write(
        &self,
        key: &[u8],
        value: &[u8],
        priority: Priority,
        overwrite: bool,
        _timeout: Duration,
    ) -> Result<()> {
        let mut inner = self.write_guard()?;
        if !overwrite && inner.contains_key(key) {
            return Err(StoreError::KeyExists(key.to_vec()));
        }
        debug!(key_len = key.len(), value_len = value.len(), %priority, "memory write");
        inner.insert(
            Bytes::copy_from_slice(key),
            Entry {
                value: Bytes::copy_from_slice(value),
                priority,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        self.write_guard()?.remove(key);
        Ok(())
    }

    async fn contains_key(&self, key: &[u8]) -> Result<bool> {
        Ok(self.read_guard()?.contains_key(key))
    }

    async fn get_all_keys(&self) -> Result<Vec<Bytes>> {
        Ok(self.read_guard()?.keys().cloned().collect())
    }
}
