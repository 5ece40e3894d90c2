//! # Origin Store
//!
//! Storage abstraction for origin chains. Provides a trait-based byte-keyed
//! map with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The navigator depends only on [`StorageProvider`], so chain logic is
//! storage-agnostic. The persistent implementation is [`SqliteStore`], with
//! [`MemoryStore`] for tests.
//!
//! ## Key Types
//!
//! - [`StorageProvider`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`Priority`] - Write priority hint
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use origin_store::{Priority, SqliteStore, StorageProvider};
//!
//! async fn example() {
//!     let store = SqliteStore::open("origin.db").unwrap();
//!     let timeout = Duration::from_secs(60);
//!     store.write(b"key", b"value", Priority::Medium, true, timeout).await.unwrap();
//!     let value = store.read(b"key", timeout).await.unwrap();
//!     assert_eq!(value.as_deref(), Some(&b"value"[..]));
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Non-overwriting writes**: fail with `KeyExists` rather than silently
//!   keeping the old value
//! - **Timeouts**: enforced by the SQLite backend with `tokio::time::timeout`
//! - **Key order**: `get_all_keys` returns keys in ascending byte order

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Priority, StorageProvider};
