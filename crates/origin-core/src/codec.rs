//! Packing: the wire form of a typed value.
//!
//! ```text
//! TypedValue := major minor payload
//! SizedValue := major minor size(u8|u16|u32, BE) payload
//!               where size = len(size) + len(payload)
//! ```
//!
//! The size prefix counts itself. Unpacking reads the total first and slices
//! the payload out of it, so the prefix value must never be the bare payload
//! length.

use std::sync::Arc;

use crate::cursor::Reader;
use crate::error::{CodecError, Result};
use crate::object::TypedValue;
use crate::registry::{Creator, Registry};
use crate::types::{Framing, TypeCode};

/// Serializes values to their wire form and asks the registry to unpack.
#[derive(Debug, Clone)]
pub struct Packer {
    registry: Arc<Registry>,
}

impl Packer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Pack `value` under `(major, minor)`.
    ///
    /// Produces `[major, minor]? ++ size_prefix? ++ payload`. The size prefix
    /// is present only if the creator for the code declares one.
    pub fn serialize(
        &self,
        value: &dyn TypedValue,
        major: u8,
        minor: u8,
        include_type_bytes: bool,
    ) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        write_value_as(
            &self.registry,
            value,
            TypeCode::new(major, minor),
            include_type_bytes,
            &mut out,
        )?;
        Ok(out)
    }

    /// Pack `value` under its own type code, type bytes included.
    pub fn pack(&self, value: &dyn TypedValue) -> Result<Vec<u8>> {
        let code = value.type_code();
        self.serialize(value, code.major, code.minor, true)
    }

    /// Unpack a buffer holding exactly one value. `None` if its type is unknown.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Option<Box<dyn TypedValue>>> {
        self.registry.decode(bytes)
    }
}

/// Write `value` under its own type code.
pub fn write_value(
    registry: &Registry,
    value: &dyn TypedValue,
    include_type_bytes: bool,
    out: &mut Vec<u8>,
) -> Result<()> {
    write_value_as(registry, value, value.type_code(), include_type_bytes, out)
}

/// Write `value` under `code`, framed the way the creator for `code` declares.
pub fn write_value_as(
    registry: &Registry,
    value: &dyn TypedValue,
    code: TypeCode,
    include_type_bytes: bool,
    out: &mut Vec<u8>,
) -> Result<()> {
    write_frame(registry, code, include_type_bytes, out, |out| {
        value.write_body(registry, out)
    })
}

/// Write a frame for `code` whose payload is produced by `body`.
///
/// Fixed-size creators have their payload length checked; prefixed creators
/// get the total length back-patched once the payload is known.
pub fn write_frame<F>(
    registry: &Registry,
    code: TypeCode,
    include_type_bytes: bool,
    out: &mut Vec<u8>,
    body: F,
) -> Result<()>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let creator = registry
        .lookup_code(code)
        .ok_or_else(|| CodecError::unknown(code))?;

    if include_type_bytes {
        out.extend_from_slice(&code.id());
    }

    match creator.framing() {
        Framing::Fixed(size) => {
            let start = out.len();
            body(out)?;
            let written = out.len() - start;
            if written != size as usize {
                return Err(CodecError::Malformed(format!(
                    "type {} is fixed at {} bytes, payload is {}",
                    code, size, written
                )));
            }
        }
        Framing::Prefixed(width) => {
            let start = out.len();
            out.resize(start + width.bytes(), 0);
            body(out)?;
            let total = out.len() - start;
            let prefix = width.encode(total)?;
            out[start..start + width.bytes()].copy_from_slice(&prefix);
        }
    }
    Ok(())
}

/// Read one value whose type tag has already been consumed.
///
/// Slices exactly the bytes `creator` declares and hands the payload to it.
pub fn read_untagged(
    registry: &Registry,
    creator: &dyn Creator,
    reader: &mut Reader<'_>,
) -> Result<Box<dyn TypedValue>> {
    let body = match creator.framing() {
        Framing::Fixed(size) => reader.take(size as usize)?,
        Framing::Prefixed(width) => {
            let total = reader.peek_size(width)?;
            if total < width.bytes() {
                return Err(CodecError::Framing(format!(
                    "size prefix {} smaller than its own width {}",
                    total,
                    width.bytes()
                )));
            }
            let framed = reader.take(total)?;
            &framed[width.bytes()..]
        }
    };
    creator.create_from_packed(body, registry)
}

/// Read one tagged value. Unknown types are an error here.
///
/// Used inside containers, where an unknown element aborts the whole decode.
pub fn read_tagged(registry: &Registry, reader: &mut Reader<'_>) -> Result<Box<dyn TypedValue>> {
    let code = reader.read_type_code()?;
    let creator = registry
        .lookup_code(code)
        .ok_or_else(|| CodecError::unknown(code))?;
    read_untagged(registry, creator.as_ref(), reader)
}

/// Read one tagged value and require it to be a `T`.
pub fn read_tagged_as<T: TypedValue>(registry: &Registry, reader: &mut Reader<'_>) -> Result<T> {
    let value = read_tagged(registry, reader)?;
    expect_kind(value)
}

/// Unwrap a decoded value into its concrete kind.
pub fn expect_kind<T: TypedValue>(value: Box<dyn TypedValue>) -> Result<T> {
    let code = value.type_code();
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .ok_or_else(|| {
            CodecError::Malformed(format!(
                "unexpected type {} where {} was required",
                code,
                std::any::type_name::<T>()
            ))
        })
}
