//! Error types for origin-core.

use thiserror::Error;

use crate::types::TypeCode;

/// Errors raised while packing or unpacking typed values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// No creator registered for a type code found inside a container, or
    /// requested explicitly when packing.
    #[error("unknown type {major:02x} {minor:02x}")]
    UnknownType { major: u8, minor: u8 },

    /// A size prefix or element length would read past the available bytes.
    #[error("framing error: {0}")]
    Framing(String),

    /// The packed size does not fit the declared prefix width.
    #[error("packed size {size} does not fit a {width}-byte size prefix")]
    SizeOverflow { width: usize, size: usize },

    /// The bytes were framed correctly but do not describe a valid value.
    #[error("malformed value: {0}")]
    Malformed(String),
}

impl CodecError {
    pub(crate) fn unknown(code: TypeCode) -> Self {
        CodecError::UnknownType {
            major: code.major,
            minor: code.minor,
        }
    }
}

/// Errors from a hash provider.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("hash computation failed: {0}")]
    Computation(String),
}

/// Errors from a signer.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Errors while assembling a bound witness.
#[derive(Debug, Error)]
pub enum WitnessError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("bound witness has no parties")]
    NoParties,
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
