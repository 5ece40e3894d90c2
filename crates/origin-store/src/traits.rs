//! The storage capability: an async byte-keyed map.
//!
//! Chain logic never sees a concrete backend. Keys and values are opaque
//! bytes; the navigator decides what they mean.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Write priority hint. Backends may record it but must not reorder
/// writes to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Stable numeric form for persistence.
    pub const fn as_u8(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

/// The StorageProvider trait: async key/value persistence.
///
/// All methods are async to support both blocking (SQLite) and async
/// backends. Operations on distinct keys may run concurrently.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Read the value at `key`, or `None` if absent.
    async fn read(&self, key: &[u8], timeout: Duration) -> Result<Option<Bytes>>;

    /// Write `value` at `key`.
    ///
    /// With `overwrite == false`, an existing key fails with
    /// [`StoreError::KeyExists`](crate::StoreError::KeyExists).
    async fn write(
        &self,
        key: &[u8],
        value: &[u8],
        priority: Priority,
        overwrite: bool,
        timeout: Duration,
    ) -> Result<()>;

    /// Delete `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &[u8]) -> Result<()>;

    /// Whether `key` is present.
    async fn contains_key(&self, key: &[u8]) -> Result<bool>;

    /// Every key in the store, in ascending byte order.
    async fn get_all_keys(&self) -> Result<Vec<Bytes>>;
}
