//! # Origin Core
//!
//! Pure primitives for origin chains: self-describing typed values, the
//! creator registry that decodes them, arrays, hashes and bound witnesses.
//!
//! This crate does no storage I/O. Hashing is exposed as an async capability
//! so chain logic can await it, but both bundled providers compute inline.
//!
//! ## Wire Format
//!
//! Every value starts with a two-byte type code `(major, minor)`. Fixed-size
//! kinds follow with their payload directly. Variable-size kinds carry a
//! big-endian size prefix of 1, 2 or 4 bytes whose value counts the prefix
//! itself plus the payload. See [`codec`].
//!
//! ## Key Types
//!
//! - [`TypedValue`] - Anything that can be packed under a type code
//! - [`Creator`] - Decodes the payload of one type code
//! - [`Registry`] - Explicit table of creators, shared behind an `Arc`
//! - [`Packer`] - Serializes values and asks the registry to unpack
//! - [`MultiTypeArray`] / [`TypedArray`] - The two array layouts
//! - [`BoundWitness`] - The signed block an origin chain is made of
//! - [`HashProvider`] / [`Signer`] - Capabilities the chain logic depends on
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use origin_core::{Index, Packer, Registry};
//!
//! let packer = Packer::new(Arc::new(Registry::standard()));
//! let bytes = packer.pack(&Index(1)).unwrap();
//! assert_eq!(bytes, [0x02, 0x05, 0, 0, 0, 1]);
//!
//! let value = packer.deserialize(&bytes).unwrap().unwrap();
//! assert_eq!(value.downcast_ref::<Index>(), Some(&Index(1)));
//! ```

pub mod array;
pub mod codec;
pub mod crypto;
pub mod cursor;
pub mod error;
pub mod hash;
pub mod object;
pub mod registry;
pub mod types;
pub mod witness;

pub use array::{ArrayCreator, ArrayLayout, MultiTypeArray, TypedArray};
pub use codec::Packer;
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Ed25519Signer, Signer};
pub use error::{CodecError, HashError, Result, SignerError, WitnessError};
pub use hash::{Blake3HashProvider, HashCreator, HashProvider, HashValue, Sha256HashProvider};
pub use object::{RawCreator, RawValue, TypedValue, ValueBase};
pub use registry::{Creator, Registry, RegistryBuilder};
pub use types::{Framing, SizeWidth, TypeCode};
pub use witness::{BoundWitness, BoundWitnessBuilder, Index, Payload, PreviousHash};
