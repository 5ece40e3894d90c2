//! Error types for the navigator.

use origin_core::{CodecError, HashError};
use origin_store::StoreError;
use thiserror::Error;

/// Errors that can occur during navigator operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Packing or unpacking failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The hash provider failed.
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A stored value under a block key is not a bound witness.
    #[error("value at {0} is not a bound witness")]
    NotABlock(String),
}

/// Result type for navigator operations.
pub type Result<T> = std::result::Result<T, ChainError>;
