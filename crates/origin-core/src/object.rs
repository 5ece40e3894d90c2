//! The object model: every protocol value is a [`TypedValue`].
//!
//! Values are handled as `Box<dyn TypedValue>` once decoded, so containers
//! can hold any registered kind. Equality is structural: two values are equal
//! when they have the same type code and the same concrete contents.

use std::any::Any;
use std::fmt;

use bytes::Bytes;

use crate::cursor::Reader;
use crate::error::Result;
use crate::registry::{Creator, Registry};
use crate::types::{Framing, TypeCode};

/// A value that can be packed under a two-byte type code.
pub trait TypedValue: ValueBase + fmt::Debug + Send + Sync {
    /// The type code this value is packed under.
    fn type_code(&self) -> TypeCode;

    /// The on-wire id, `[major, minor]`.
    fn id(&self) -> [u8; 2] {
        self.type_code().id()
    }

    /// Write the payload: no type tag, no size prefix.
    ///
    /// Containers receive the registry so they can frame nested values.
    fn write_body(&self, registry: &Registry, out: &mut Vec<u8>) -> Result<()>;
}

/// Object-safe plumbing for [`TypedValue`]: downcasting, equality and cloning.
///
/// Implemented automatically for every `TypedValue + Clone + PartialEq`.
pub trait ValueBase: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn dyn_eq(&self, other: &dyn Any) -> bool;
    fn clone_boxed(&self) -> Box<dyn TypedValue>;
}

impl<T> ValueBase for T
where
    T: TypedValue + Clone + PartialEq + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().map_or(false, |o| self == o)
    }

    fn clone_boxed(&self) -> Box<dyn TypedValue> {
        Box::new(self.clone())
    }
}

impl dyn TypedValue {
    /// Borrow the concrete value, if it is a `T`.
    pub fn downcast_ref<T: TypedValue>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Take the concrete value, if it is a `T`.
    pub fn downcast<T: TypedValue>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast::<T>().ok()
    }

    pub fn is<T: TypedValue>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl PartialEq for dyn TypedValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_code() == other.type_code() && self.dyn_eq(other.as_any())
    }
}

impl Eq for dyn TypedValue {}

impl Clone for Box<dyn TypedValue> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

/// An opaque value: a type code and its raw payload bytes.
///
/// Used for application kinds that need no structure beyond their bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct RawValue {
    code: TypeCode,
    payload: Bytes,
}

impl RawValue {
    pub fn new(code: TypeCode, payload: impl Into<Bytes>) -> Self {
        Self {
            code,
            payload: payload.into(),
        }
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawValue({}, {})", self.code, hex::encode(&self.payload))
    }
}

impl TypedValue for RawValue {
    fn type_code(&self) -> TypeCode {
        self.code
    }

    fn write_body(&self, _registry: &Registry, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.payload);
        Ok(())
    }
}

/// Creator for [`RawValue`]s under a caller-chosen code and framing.
#[derive(Debug, Clone)]
pub struct RawCreator {
    code: TypeCode,
    framing: Framing,
}

impl RawCreator {
    pub fn new(code: TypeCode, framing: Framing) -> Self {
        Self { code, framing }
    }
}

impl Creator for RawCreator {
    fn type_code(&self) -> TypeCode {
        self.code
    }

    fn framing(&self) -> Framing {
        self.framing
    }

    fn create_from_packed(&self, body: &[u8], _registry: &Registry) -> Result<Box<dyn TypedValue>> {
        Ok(Box::new(RawValue::new(self.code, Bytes::copy_from_slice(body))))
    }
}

/// A big-endian `u32` carried as a fixed four-byte value.
///
/// Shared by kinds such as the origin-chain index.
pub(crate) fn read_fixed_u32(body: &[u8]) -> Result<u32> {
    let mut reader = Reader::new(body);
    let n = reader.read_u32()?;
    reader.finish()?;
    Ok(n)
}
