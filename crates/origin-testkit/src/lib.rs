//! # Origin Testkit
//!
//! Testing utilities for origin chains.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Exact packed bytes for known values
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A party with a signer, chain state and in-memory navigator
//!
//! ## Golden Vectors
//!
//! ```rust
//! use origin_testkit::vectors::verify_all_vectors;
//!
//! for result in verify_all_vectors() {
//!     assert!(result.matches, "{}: {}", result.name, result.actual_hex);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use origin_testkit::generators::{block_from_params, test_registry, BlockParams};
//!
//! proptest! {
//!     #[test]
//!     fn block_packing_is_deterministic(params: BlockParams) {
//!         let registry = test_registry();
//!         let b1 = block_from_params(&params, &registry);
//!         let b2 = block_from_params(&params, &registry);
//!         prop_assert_eq!(b1, b2);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use origin_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::with_seed([1; 32]);
//! let genesis = fixture.make_block();
//! assert_eq!(genesis.party_count(), 1);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_block, multi_party_fixtures, MemoryNavigator, TestFixture};
pub use generators::{block_from_params, test_registry, BlockParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector, VectorResult};
