//! # Origin Chain
//!
//! Persists origin chains: hash-linked sequences of bound witnesses kept in
//! a byte-keyed store.
//!
//! ## Overview
//!
//! [`OriginChainNavigator`] stores each block under its packed hash and
//! writes a forward link from every block it references, so a chain can be
//! walked from genesis onwards. [`OriginChainState`] tracks the local party's
//! position and produces the heuristics for its next block.
//!
//! ## Key Types
//!
//! - [`OriginChainNavigator`] - Block persistence and link traversal
//! - [`AddReport`] - Per-link outcome of storing a block
//! - [`OriginBlock`] - Chain heuristics read from a bound witness
//! - [`NavigatorConfig`] - Write priority, overwrite policy and timeouts
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use origin_chain::{NavigatorConfig, OriginChainNavigator, OriginChainState};
//! use origin_chain::core::{BoundWitnessBuilder, Ed25519Signer, Registry, Sha256HashProvider};
//! use origin_chain::store::MemoryStore;
//!
//! async fn example() {
//!     let registry = Arc::new(Registry::standard());
//!     let navigator = OriginChainNavigator::new(
//!         registry.clone(),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(Sha256HashProvider),
//!         NavigatorConfig::default(),
//!     );
//!
//!     let signer = Ed25519Signer::generate();
//!     let mut state = OriginChainState::new();
//!     let block = BoundWitnessBuilder::new()
//!         .party(&[&signer], state.next_heuristics(), vec![])
//!         .build(&registry)
//!         .unwrap();
//!
//!     let report = navigator.add_bound_witness(&block).await.unwrap();
//!     state.record_block(report.hash);
//! }
//! ```

pub mod config;
pub mod error;
pub mod navigator;
pub mod origin_block;
pub mod state;

pub use origin_core as core;
pub use origin_store as store;

pub use config::NavigatorConfig;
pub use error::{ChainError, Result};
pub use navigator::{forward_link_key, AddReport, LinkOutcome, OriginChainNavigator, FORWARD_LINK_PREFIX};
pub use origin_block::OriginBlock;
pub use state::OriginChainState;
