//! Strong type definitions for the wire protocol.
//!
//! Type codes, size-prefix widths, and the framing a creator declares are
//! newtypes so they cannot be mixed up with raw bytes.

use std::fmt;

use crate::error::{CodecError, Result};

/// The two-byte type tag carried by every value on the wire.
///
/// `major` selects the family (arrays, bound witness parts, hashes, keys...),
/// `minor` the concrete kind within it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeCode {
    pub major: u8,
    pub minor: u8,
}

impl TypeCode {
    /// Create a type code from its major and minor bytes.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// The on-wire id: `[major, minor]`.
    pub const fn id(&self) -> [u8; 2] {
        [self.major, self.minor]
    }
}

impl fmt::Debug for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeCode({:02x} {:02x})", self.major, self.minor)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}", self.major, self.minor)
    }
}

impl From<[u8; 2]> for TypeCode {
    fn from(id: [u8; 2]) -> Self {
        Self::new(id[0], id[1])
    }
}

/// Width of a big-endian size prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeWidth {
    One,
    Two,
    Four,
}

impl SizeWidth {
    /// Number of bytes the prefix occupies.
    pub const fn bytes(self) -> usize {
        match self {
            SizeWidth::One => 1,
            SizeWidth::Two => 2,
            SizeWidth::Four => 4,
        }
    }

    /// Largest total (prefix + payload) length the prefix can express.
    pub const fn max_total(self) -> u64 {
        match self {
            SizeWidth::One => u8::MAX as u64,
            SizeWidth::Two => u16::MAX as u64,
            SizeWidth::Four => u32::MAX as u64,
        }
    }

    /// Map a byte count to a width, if it is one of 1, 2 or 4.
    pub const fn from_bytes(n: u32) -> Option<Self> {
        match n {
            1 => Some(SizeWidth::One),
            2 => Some(SizeWidth::Two),
            4 => Some(SizeWidth::Four),
            _ => None,
        }
    }

    /// Encode `total` as a prefix of this width.
    ///
    /// Fails with [`CodecError::SizeOverflow`] when `total` does not fit.
    pub fn encode(self, total: usize) -> Result<Vec<u8>> {
        if total as u64 > self.max_total() {
            return Err(CodecError::SizeOverflow {
                width: self.bytes(),
                size: total,
            });
        }
        Ok(match self {
            SizeWidth::One => vec![total as u8],
            SizeWidth::Two => (total as u16).to_be_bytes().to_vec(),
            SizeWidth::Four => (total as u32).to_be_bytes().to_vec(),
        })
    }
}

/// How a creator's values are delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framing {
    /// Payload is always exactly this many bytes; no size prefix.
    Fixed(u32),
    /// Payload is preceded by a size prefix of this width. The prefix counts
    /// itself plus the payload.
    Prefixed(SizeWidth),
}

impl Framing {
    /// Fixed payload size, or `None` if the size is carried on the wire.
    pub const fn default_size(self) -> Option<u32> {
        match self {
            Framing::Fixed(n) => Some(n),
            Framing::Prefixed(_) => None,
        }
    }

    /// Width of the size prefix, or `None` for fixed-size values.
    pub const fn size_of_size(self) -> Option<u32> {
        match self {
            Framing::Fixed(_) => None,
            Framing::Prefixed(w) => Some(w.bytes() as u32),
        }
    }
}
