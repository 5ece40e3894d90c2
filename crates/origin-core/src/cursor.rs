//! Bounds-checked cursor over packed bytes.
//!
//! Every read advances an explicit offset and fails with
//! [`CodecError::Framing`] instead of indexing out of bounds.

use crate::error::{CodecError, Result};
use crate::types::{SizeWidth, TypeCode};

/// A forward-only reader over a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Consume exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(CodecError::Framing(format!(
                "need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_type_code(&mut self) -> Result<TypeCode> {
        let bytes = self.take(2)?;
        Ok(TypeCode::new(bytes[0], bytes[1]))
    }

    /// Read a big-endian size prefix of the given width without consuming it.
    pub fn peek_size(&self, width: SizeWidth) -> Result<usize> {
        let mut probe = self.clone();
        probe.read_size(width)
    }

    /// Read a big-endian size prefix of the given width.
    pub fn read_size(&mut self, width: SizeWidth) -> Result<usize> {
        let bytes = self.take(width.bytes())?;
        Ok(bytes
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | usize::from(b)))
    }

    /// Fail unless every byte has been consumed.
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CodecError::Framing(format!(
                "{} trailing bytes at offset {}",
                self.remaining(),
                self.pos
            )))
        }
    }
}
