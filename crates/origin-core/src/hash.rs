//! Hash values and the hash provider capability.
//!
//! A [`HashValue`] is a fixed-size typed value whose code names the
//! algorithm. Chain logic only sees the [`HashProvider`] trait.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};

use crate::error::{CodecError, HashError, Result};
use crate::object::TypedValue;
use crate::registry::{Creator, Registry};
use crate::types::{Framing, TypeCode};

/// Hash type codes.
pub mod codes {
    use crate::types::TypeCode;

    pub const SHA256: TypeCode = TypeCode::new(0x03, 0x05);
    pub const BLAKE3: TypeCode = TypeCode::new(0x03, 0x0a);
    pub const MD5: TypeCode = TypeCode::new(0x03, 0x10);
}

/// A digest tagged with the algorithm that produced it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HashValue {
    code: TypeCode,
    digest: Bytes,
}

impl HashValue {
    pub fn new(code: TypeCode, digest: impl Into<Bytes>) -> Self {
        Self {
            code,
            digest: digest.into(),
        }
    }

    pub fn digest(&self) -> &Bytes {
        &self.digest
    }

    /// Convert the digest to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.digest)
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "HashValue({}, {})", self.code, &hex[..hex.len().min(16)])
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TypedValue for HashValue {
    fn type_code(&self) -> TypeCode {
        self.code
    }

    fn write_body(&self, _registry: &Registry, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.digest);
        Ok(())
    }
}

/// Creator for one hash algorithm's values.
#[derive(Debug, Clone)]
pub struct HashCreator {
    code: TypeCode,
    size: u32,
}

impl HashCreator {
    pub const fn new(code: TypeCode, size: u32) -> Self {
        Self { code, size }
    }

    pub const fn md5() -> Self {
        Self::new(codes::MD5, 16)
    }

    pub const fn sha256() -> Self {
        Self::new(codes::SHA256, 32)
    }

    pub const fn blake3() -> Self {
        Self::new(codes::BLAKE3, 32)
    }
}

impl Creator for HashCreator {
    fn type_code(&self) -> TypeCode {
        self.code
    }

    fn framing(&self) -> Framing {
        Framing::Fixed(self.size)
    }

    fn create_from_packed(&self, body: &[u8], _registry: &Registry) -> Result<Box<dyn TypedValue>> {
        if body.len() != self.size as usize {
            return Err(CodecError::Malformed(format!(
                "{} digest must be {} bytes, got {}",
                self.code,
                self.size,
                body.len()
            )));
        }
        Ok(Box::new(HashValue::new(self.code, Bytes::copy_from_slice(body))))
    }
}

/// Computes typed hashes over bytes.
///
/// Computation is a suspension point so providers may offload to a worker
/// or a remote service.
#[async_trait]
pub trait HashProvider: Send + Sync {
    /// The type code of the values this provider produces.
    fn hash_code(&self) -> TypeCode;

    /// Hash `data`.
    async fn compute(&self, data: &[u8]) -> std::result::Result<HashValue, HashError>;
}

/// SHA-256 hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256HashProvider;

#[async_trait]
impl HashProvider for Sha256HashProvider {
    fn hash_code(&self) -> TypeCode {
        codes::SHA256
    }

    async fn compute(&self, data: &[u8]) -> std::result::Result<HashValue, HashError> {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Ok(HashValue::new(codes::SHA256, hasher.finalize().to_vec()))
    }
}

/// BLAKE3 hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3HashProvider;

#[async_trait]
impl HashProvider for Blake3HashProvider {
    fn hash_code(&self) -> TypeCode {
        codes::BLAKE3
    }

    async fn compute(&self, data: &[u8]) -> std::result::Result<HashValue, HashError> {
        Ok(HashValue::new(
            codes::BLAKE3,
            blake3::hash(data).as_bytes().to_vec(),
        ))
    }
}
