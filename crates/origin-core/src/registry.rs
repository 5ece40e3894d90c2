//! The creator registry: `(major, minor)` to the creator that decodes it.
//!
//! A [`Registry`] is built once during startup from an explicit list of
//! kinds and then shared behind an `Arc`. Lookups need no synchronization.
//!
//! ```rust
//! use origin_core::{Registry, TypeCode, RawCreator, Framing, SizeWidth};
//!
//! let registry = Registry::builder()
//!     .with_standard_kinds()
//!     .with(RawCreator::new(TypeCode::new(0x20, 0x01), Framing::Prefixed(SizeWidth::One)))
//!     .build();
//!
//! assert!(registry.lookup(0x20, 0x01).is_some());
//! assert!(registry.lookup(0x20, 0x02).is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::array::ArrayCreator;
use crate::codec;
use crate::crypto::{Ed25519PublicKeyCreator, Ed25519SignatureCreator};
use crate::cursor::Reader;
use crate::error::Result;
use crate::hash::HashCreator;
use crate::object::TypedValue;
use crate::types::{Framing, TypeCode};
use crate::witness::{BoundWitnessCreator, IndexCreator, PayloadCreator, PreviousHashCreator};

/// Decodes values of exactly one type code.
pub trait Creator: Send + Sync {
    /// The type code this creator decodes.
    fn type_code(&self) -> TypeCode;

    /// How values of this type are delimited on the wire.
    fn framing(&self) -> Framing;

    /// Fixed payload size, or `None` if the size is carried on the wire.
    fn default_size(&self) -> Option<u32> {
        self.framing().default_size()
    }

    /// Width of the on-wire size prefix, or `None` for fixed-size values.
    fn size_of_size(&self) -> Option<u32> {
        self.framing().size_of_size()
    }

    /// Build a value from its payload.
    ///
    /// `body` is the payload only: the type tag and size prefix have already
    /// been consumed and checked by the caller.
    fn create_from_packed(&self, body: &[u8], registry: &Registry) -> Result<Box<dyn TypedValue>>;
}

/// Table of creators keyed by major, then minor.
#[derive(Default)]
pub struct Registry {
    creators: HashMap<u8, HashMap<u8, Arc<dyn Creator>>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every standard kind.
    pub fn standard() -> Self {
        Self::builder().with_standard_kinds().build()
    }

    /// Start an explicit registration phase.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Insert or replace the creator for `(major, minor)`.
    ///
    /// The last registration for a code pair wins.
    pub fn register(&mut self, major: u8, minor: u8, creator: Arc<dyn Creator>) {
        let minors = self.creators.entry(major).or_default();
        if minors.insert(minor, creator).is_some() {
            tracing::debug!(major, minor, "replaced creator");
        }
    }

    /// Find the creator for `(major, minor)`.
    pub fn lookup(&self, major: u8, minor: u8) -> Option<Arc<dyn Creator>> {
        self.creators.get(&major)?.get(&minor).cloned()
    }

    /// Find the creator for a [`TypeCode`].
    pub fn lookup_code(&self, code: TypeCode) -> Option<Arc<dyn Creator>> {
        self.lookup(code.major, code.minor)
    }

    /// Number of registered creators.
    pub fn len(&self) -> usize {
        self.creators.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode a buffer holding exactly one packed value.
    ///
    /// Returns `Ok(None)` if no creator is registered for the leading type
    /// code; the caller decides whether that is fatal. Framing problems and
    /// trailing bytes are errors.
    pub fn decode(&self, bytes: &[u8]) -> Result<Option<Box<dyn TypedValue>>> {
        let mut reader = Reader::new(bytes);
        let code = reader.read_type_code()?;
        let Some(creator) = self.lookup_code(code) else {
            return Ok(None);
        };
        let value = codec::read_untagged(self, creator.as_ref(), &mut reader)?;
        reader.finish()?;
        Ok(Some(value))
    }

    /// Decode the value at the head of `bytes`.
    ///
    /// Returns the value and how many bytes it occupied.
    pub fn decode_prefix(&self, bytes: &[u8]) -> Result<Option<(Box<dyn TypedValue>, usize)>> {
        let mut reader = Reader::new(bytes);
        let code = reader.read_type_code()?;
        let Some(creator) = self.lookup_code(code) else {
            return Ok(None);
        };
        let value = codec::read_untagged(self, creator.as_ref(), &mut reader)?;
        Ok(Some((value, reader.position())))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<TypeCode> = self
            .creators
            .iter()
            .flat_map(|(&major, minors)| minors.keys().map(move |&minor| TypeCode::new(major, minor)))
            .collect();
        codes.sort();
        f.debug_struct("Registry").field("codes", &codes).finish()
    }
}

/// Collects creators for a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    creators: Vec<Arc<dyn Creator>>,
}

impl RegistryBuilder {
    /// Add a creator. Later additions replace earlier ones with the same code.
    pub fn with(mut self, creator: impl Creator + 'static) -> Self {
        self.creators.push(Arc::new(creator));
        self
    }

    /// Add a shared creator.
    pub fn with_shared(mut self, creator: Arc<dyn Creator>) -> Self {
        self.creators.push(creator);
        self
    }

    /// Add every standard kind: arrays, bound witness parts, hashes, keys.
    pub fn with_standard_kinds(self) -> Self {
        self.with_arrays()
            .with_witness_kinds()
            .with_hashes()
            .with_ed25519()
    }

    /// The six generic array kinds.
    pub fn with_arrays(mut self) -> Self {
        for creator in ArrayCreator::standard() {
            self.creators.push(Arc::new(creator));
        }
        self
    }

    /// Bound witness, key set, signature set, payload, index, previous hash.
    pub fn with_witness_kinds(self) -> Self {
        self.with(ArrayCreator::key_set())
            .with(ArrayCreator::signature_set())
            .with(BoundWitnessCreator)
            .with(PayloadCreator)
            .with(IndexCreator)
            .with(PreviousHashCreator)
    }

    /// MD5, SHA-256 and BLAKE3 hash values.
    pub fn with_hashes(self) -> Self {
        self.with(HashCreator::md5())
            .with(HashCreator::sha256())
            .with(HashCreator::blake3())
    }

    /// Ed25519 public keys and signatures.
    pub fn with_ed25519(self) -> Self {
        self.with(Ed25519PublicKeyCreator)
            .with(Ed25519SignatureCreator)
    }

    pub fn build(self) -> Registry {
        let mut registry = Registry::new();
        for creator in self.creators {
            let code = creator.type_code();
            registry.register(code.major, code.minor, creator);
        }
        registry
    }
}
