//! Signing capability and the Ed25519 implementation of it.
//!
//! Bound witness assembly only depends on [`Signer`]. Ed25519 keys and
//! signatures are ordinary fixed-size typed values.

use std::fmt;

use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier, VerifyingKey};

use crate::error::{CodecError, Result, SignerError};
use crate::object::TypedValue;
use crate::registry::{Creator, Registry};
use crate::types::{Framing, TypeCode};

/// Key and signature type codes.
pub mod codes {
    use crate::types::TypeCode;

    pub const ED25519_PUBLIC_KEY: TypeCode = TypeCode::new(0x04, 0x02);
    pub const ED25519_SIGNATURE: TypeCode = TypeCode::new(0x05, 0x02);
}

/// Produces a public key and signatures over bytes.
pub trait Signer: Send + Sync {
    /// The public key, as a typed value.
    fn public_key(&self) -> Box<dyn TypedValue>;

    /// Sign `data`, returning the signature as a typed value.
    fn sign(&self, data: &[u8]) -> std::result::Result<Box<dyn TypedValue>, SignerError>;
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        verifying_key
            .verify(message, &Signature::from_bytes(&signature.0))
            .is_ok()
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

impl TypedValue for Ed25519PublicKey {
    fn type_code(&self) -> TypeCode {
        codes::ED25519_PUBLIC_KEY
    }

    fn write_body(&self, _registry: &Registry, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.0);
        Ok(())
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &self.to_hex()[..16])
    }
}

impl TypedValue for Ed25519Signature {
    fn type_code(&self) -> TypeCode {
        codes::ED25519_SIGNATURE
    }

    fn write_body(&self, _registry: &Registry, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.0);
        Ok(())
    }
}

fn fixed<const N: usize>(body: &[u8], what: &str) -> Result<[u8; N]> {
    body.try_into().map_err(|_| {
        CodecError::Malformed(format!("{} must be {} bytes, got {}", what, N, body.len()))
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519PublicKeyCreator;

impl Creator for Ed25519PublicKeyCreator {
    fn type_code(&self) -> TypeCode {
        codes::ED25519_PUBLIC_KEY
    }

    fn framing(&self) -> Framing {
        Framing::Fixed(32)
    }

    fn create_from_packed(&self, body: &[u8], _registry: &Registry) -> Result<Box<dyn TypedValue>> {
        Ok(Box::new(Ed25519PublicKey(fixed(body, "public key")?)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519SignatureCreator;

impl Creator for Ed25519SignatureCreator {
    fn type_code(&self) -> TypeCode {
        codes::ED25519_SIGNATURE
    }

    fn framing(&self) -> Framing {
        Framing::Fixed(64)
    }

    fn create_from_packed(&self, body: &[u8], _registry: &Registry) -> Result<Box<dyn TypedValue>> {
        Ok(Box::new(Ed25519Signature(fixed(body, "signature")?)))
    }
}

/// An Ed25519 keypair acting as a [`Signer`].
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The public key as its concrete type.
    pub fn verifying_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message, returning the concrete signature.
    pub fn sign_raw(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signer({:?})", self.verifying_key())
    }
}

impl Signer for Ed25519Signer {
    fn public_key(&self) -> Box<dyn TypedValue> {
        Box::new(self.verifying_key())
    }

    fn sign(&self, data: &[u8]) -> std::result::Result<Box<dyn TypedValue>, SignerError> {
        Ok(Box::new(self.sign_raw(data)))
    }
}
