//! Homogeneous and multi-type arrays.
//!
//! Both flavors are sized values whose prefix holds the total packed length.
//!
//! - [`MultiTypeArray`]: every element is written with its own type tag.
//! - [`TypedArray`]: the shared element type is written once after the
//!   prefix, elements follow without tags.
//!
//! Decoding is atomic: an unknown element type or an element that overruns
//! the declared length fails the whole array.

use std::fmt;

use crate::codec;
use crate::cursor::Reader;
use crate::error::{CodecError, Result};
use crate::object::TypedValue;
use crate::registry::{Creator, Registry};
use crate::types::{Framing, SizeWidth, TypeCode};

/// Standard array type codes.
pub mod codes {
    use crate::types::TypeCode;

    pub const TYPED_ARRAY_BYTE: TypeCode = TypeCode::new(0x01, 0x01);
    pub const TYPED_ARRAY_SHORT: TypeCode = TypeCode::new(0x01, 0x02);
    pub const TYPED_ARRAY_INT: TypeCode = TypeCode::new(0x01, 0x03);
    pub const MULTI_TYPE_ARRAY_BYTE: TypeCode = TypeCode::new(0x01, 0x04);
    pub const MULTI_TYPE_ARRAY_SHORT: TypeCode = TypeCode::new(0x01, 0x05);
    pub const MULTI_TYPE_ARRAY_INT: TypeCode = TypeCode::new(0x01, 0x06);

    pub const KEY_SET: TypeCode = TypeCode::new(0x02, 0x02);
    pub const SIGNATURE_SET: TypeCode = TypeCode::new(0x02, 0x03);
}

/// An ordered sequence of self-describing elements.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiTypeArray {
    code: TypeCode,
    elements: Vec<Box<dyn TypedValue>>,
}

impl MultiTypeArray {
    /// An array packed under `code`. The code's creator decides the prefix width.
    pub fn new(code: TypeCode, elements: Vec<Box<dyn TypedValue>>) -> Self {
        Self { code, elements }
    }

    /// Multi-type array with a 1-byte prefix.
    pub fn byte(elements: Vec<Box<dyn TypedValue>>) -> Self {
        Self::new(codes::MULTI_TYPE_ARRAY_BYTE, elements)
    }

    /// Multi-type array with a 2-byte prefix.
    pub fn short(elements: Vec<Box<dyn TypedValue>>) -> Self {
        Self::new(codes::MULTI_TYPE_ARRAY_SHORT, elements)
    }

    /// Multi-type array with a 4-byte prefix.
    pub fn int(elements: Vec<Box<dyn TypedValue>>) -> Self {
        Self::new(codes::MULTI_TYPE_ARRAY_INT, elements)
    }

    /// The public keys of one bound witness party.
    pub fn key_set(keys: Vec<Box<dyn TypedValue>>) -> Self {
        Self::new(codes::KEY_SET, keys)
    }

    /// The signatures of one bound witness party.
    pub fn signature_set(signatures: Vec<Box<dyn TypedValue>>) -> Self {
        Self::new(codes::SIGNATURE_SET, signatures)
    }

    pub fn elements(&self) -> &[Box<dyn TypedValue>] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Box<dyn TypedValue>> {
        self.elements
    }

    pub fn push(&mut self, element: Box<dyn TypedValue>) {
        self.elements.push(element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements that are a `T`, in order.
    pub fn of_kind<T: TypedValue>(&self) -> impl Iterator<Item = &T> {
        self.elements.iter().filter_map(|e| e.downcast_ref::<T>())
    }
}

impl TypedValue for MultiTypeArray {
    fn type_code(&self) -> TypeCode {
        self.code
    }

    fn write_body(&self, registry: &Registry, out: &mut Vec<u8>) -> Result<()> {
        for element in &self.elements {
            codec::write_value(registry, element.as_ref(), true, out)?;
        }
        Ok(())
    }
}

/// An ordered sequence of elements that all share one type code.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArray {
    code: TypeCode,
    element_code: TypeCode,
    elements: Vec<Box<dyn TypedValue>>,
}

impl TypedArray {
    /// An array of `element_code` values packed under `code`.
    ///
    /// Fails if any element has a different type code.
    pub fn new(
        code: TypeCode,
        element_code: TypeCode,
        elements: Vec<Box<dyn TypedValue>>,
    ) -> Result<Self> {
        if let Some(stray) = elements.iter().find(|e| e.type_code() != element_code) {
            return Err(CodecError::Malformed(format!(
                "typed array of {} holds a {}",
                element_code,
                stray.type_code()
            )));
        }
        Ok(Self {
            code,
            element_code,
            elements,
        })
    }

    pub fn byte(element_code: TypeCode, elements: Vec<Box<dyn TypedValue>>) -> Result<Self> {
        Self::new(codes::TYPED_ARRAY_BYTE, element_code, elements)
    }

    pub fn short(element_code: TypeCode, elements: Vec<Box<dyn TypedValue>>) -> Result<Self> {
        Self::new(codes::TYPED_ARRAY_SHORT, element_code, elements)
    }

    pub fn int(element_code: TypeCode, elements: Vec<Box<dyn TypedValue>>) -> Result<Self> {
        Self::new(codes::TYPED_ARRAY_INT, element_code, elements)
    }

    pub fn element_code(&self) -> TypeCode {
        self.element_code
    }

    pub fn elements(&self) -> &[Box<dyn TypedValue>] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Box<dyn TypedValue>> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl TypedValue for TypedArray {
    fn type_code(&self) -> TypeCode {
        self.code
    }

    fn write_body(&self, registry: &Registry, out: &mut Vec<u8>) -> Result<()> {
        if let Some(creator) = registry.lookup_code(self.element_code) {
            reject_zero_width(self.element_code, creator.framing())?;
        }
        out.extend_from_slice(&self.element_code.id());
        for element in &self.elements {
            codec::write_value_as(registry, element.as_ref(), self.element_code, false, out)?;
        }
        Ok(())
    }
}

/// Untagged zero-width elements carry no bytes, so their count cannot be recovered.
fn reject_zero_width(element_code: TypeCode, framing: Framing) -> Result<()> {
    if framing == Framing::Fixed(0) {
        return Err(CodecError::Malformed(format!(
            "typed array of zero-width {}",
            element_code
        )));
    }
    Ok(())
}

/// Element layout of an array kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLayout {
    /// One shared element type, untagged elements.
    Typed,
    /// Every element tagged.
    MultiType,
}

/// Creator for any array kind.
#[derive(Clone)]
pub struct ArrayCreator {
    code: TypeCode,
    width: SizeWidth,
    layout: ArrayLayout,
}

impl ArrayCreator {
    pub fn new(code: TypeCode, width: SizeWidth, layout: ArrayLayout) -> Self {
        Self {
            code,
            width,
            layout,
        }
    }

    /// The six generic array kinds.
    pub fn standard() -> [ArrayCreator; 6] {
        use ArrayLayout::{MultiType, Typed};
        [
            Self::new(codes::TYPED_ARRAY_BYTE, SizeWidth::One, Typed),
            Self::new(codes::TYPED_ARRAY_SHORT, SizeWidth::Two, Typed),
            Self::new(codes::TYPED_ARRAY_INT, SizeWidth::Four, Typed),
            Self::new(codes::MULTI_TYPE_ARRAY_BYTE, SizeWidth::One, MultiType),
            Self::new(codes::MULTI_TYPE_ARRAY_SHORT, SizeWidth::Two, MultiType),
            Self::new(codes::MULTI_TYPE_ARRAY_INT, SizeWidth::Four, MultiType),
        ]
    }

    pub fn key_set() -> Self {
        Self::new(codes::KEY_SET, SizeWidth::Two, ArrayLayout::MultiType)
    }

    pub fn signature_set() -> Self {
        Self::new(codes::SIGNATURE_SET, SizeWidth::Two, ArrayLayout::MultiType)
    }

    pub fn layout(&self) -> ArrayLayout {
        self.layout
    }
}

impl fmt::Debug for ArrayCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayCreator({}, {:?}, {:?})", self.code, self.width, self.layout)
    }
}

impl Creator for ArrayCreator {
    fn type_code(&self) -> TypeCode {
        self.code
    }

    fn framing(&self) -> Framing {
        Framing::Prefixed(self.width)
    }

    fn create_from_packed(&self, body: &[u8], registry: &Registry) -> Result<Box<dyn TypedValue>> {
        let mut reader = Reader::new(body);
        match self.layout {
            ArrayLayout::MultiType => {
                let mut elements = Vec::new();
                while !reader.is_empty() {
                    elements.push(codec::read_tagged(registry, &mut reader)?);
                }
                Ok(Box::new(MultiTypeArray::new(self.code, elements)))
            }
            ArrayLayout::Typed => {
                let element_code = reader.read_type_code()?;
                let creator = registry
                    .lookup_code(element_code)
                    .ok_or_else(|| CodecError::unknown(element_code))?;
                reject_zero_width(element_code, creator.framing())?;
                let mut elements = Vec::new();
                while !reader.is_empty() {
                    let start = reader.position();
                    elements.push(codec::read_untagged(registry, creator.as_ref(), &mut reader)?);
                    if reader.position() == start {
                        return Err(CodecError::Malformed(format!(
                            "{} element consumed no bytes",
                            element_code
                        )));
                    }
                }
                // The element creator may hand back a value under another code.
                let array = TypedArray::new(self.code, element_code, elements)?;
                Ok(Box::new(array))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Packer;
    use crate::object::{RawCreator, RawValue};
    use std::sync::Arc;

    const SMALL: TypeCode = TypeCode::new(0x20, 0x01);
    const FIXED: TypeCode = TypeCode::new(0x20, 0x02);

    fn packer() -> Packer {
        let registry = Registry::builder()
            .with_arrays()
            .with(RawCreator::new(SMALL, Framing::Prefixed(SizeWidth::One)))
            .with(RawCreator::new(FIXED, Framing::Fixed(2)))
            .build();
        Packer::new(Arc::new(registry))
    }

    fn raw(code: TypeCode, payload: &[u8]) -> Box<dyn TypedValue> {
        Box::new(RawValue::new(code, payload.to_vec()))
    }

    #[test]
    fn test_multi_type_layout() {
        let packer = packer();
        let array = MultiTypeArray::short(vec![raw(SMALL, b"A"), raw(FIXED, b"BC")]);
        let bytes = packer.pack(&array).unwrap();

        let elem_a = [0x20, 0x01, 0x02, b'A'];
        let elem_b = [0x20, 0x02, b'B', b'C'];
        let len = 2 + elem_a.len() + elem_b.len();

        let mut expected = vec![0x01, 0x05, 0x00, len as u8];
        expected.extend_from_slice(&elem_a);
        expected.extend_from_slice(&elem_b);
        assert_eq!(bytes, expected);

        let decoded = packer.deserialize(&bytes).unwrap().unwrap();
        assert_eq!(decoded.downcast_ref::<MultiTypeArray>(), Some(&array));
    }

    #[test]
    fn test_typed_layout_writes_type_once() {
        let packer = packer();
        let array = TypedArray::byte(FIXED, vec![raw(FIXED, b"ab"), raw(FIXED, b"cd")]).unwrap();
        let bytes = packer.pack(&array).unwrap();
        assert_eq!(
            bytes,
            vec![0x01, 0x01, 0x07, 0x20, 0x02, b'a', b'b', b'c', b'd']
        );

        let decoded = packer.deserialize(&bytes).unwrap().unwrap();
        let typed = decoded.downcast_ref::<TypedArray>().unwrap();
        assert_eq!(typed.element_code(), FIXED);
        assert_eq!(typed, &array);
    }

    #[test]
    fn test_typed_array_rejects_mixed_elements() {
        let result = TypedArray::short(FIXED, vec![raw(FIXED, b"ab"), raw(SMALL, b"c")]);
        assert!(matches!(result, Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_empty_arrays() {
        let packer = packer();

        let multi = MultiTypeArray::int(vec![]);
        let bytes = packer.pack(&multi).unwrap();
        assert_eq!(bytes, vec![0x01, 0x06, 0x00, 0x00, 0x00, 0x04]);
        let decoded = packer.deserialize(&bytes).unwrap().unwrap();
        assert!(decoded.downcast_ref::<MultiTypeArray>().unwrap().is_empty());

        let typed = TypedArray::short(SMALL, vec![]).unwrap();
        let bytes = packer.pack(&typed).unwrap();
        assert_eq!(bytes, vec![0x01, 0x02, 0x00, 0x04, 0x20, 0x01]);
        let decoded = packer.deserialize(&bytes).unwrap().unwrap();
        assert!(decoded.downcast_ref::<TypedArray>().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_element_fails_whole_array() {
        let packer = packer();
        let mut bytes = vec![0x01, 0x05, 0x00, 0x00];
        bytes.extend_from_slice(&[0x20, 0x02, b'o', b'k']);
        bytes.extend_from_slice(&[0x7e, 0x7e, 0x01]);
        let len = bytes.len() - 2;
        bytes[3] = len as u8;

        assert!(matches!(
            packer.deserialize(&bytes),
            Err(CodecError::UnknownType { major: 0x7e, minor: 0x7e })
        ));
    }

    #[test]
    fn test_element_overrun_is_framing_error() {
        let packer = packer();
        // Array holds 6 bytes; the element inside claims 9.
        let bytes = vec![0x01, 0x05, 0x00, 0x06, 0x20, 0x01, 0x09, b'x'];
        assert!(matches!(
            packer.deserialize(&bytes),
            Err(CodecError::Framing(_))
        ));
    }

    #[test]
    fn test_prefix_overflow_at_encode() {
        let packer = packer();
        // 300 elements of 4 bytes each overflow a 1-byte prefix.
        let elements = (0..300).map(|_| raw(FIXED, b"zz")).collect();
        let array = MultiTypeArray::byte(elements);
        assert!(matches!(
            packer.pack(&array),
            Err(CodecError::SizeOverflow { width: 1, .. })
        ));
    }

    #[test]
    fn test_short_prefix_overflow_at_encode() {
        let packer = packer();
        // 17000 tagged elements of 4 bytes each pass 65535.
        let elements = (0..17_000).map(|_| raw(FIXED, b"zz")).collect();
        let array = MultiTypeArray::short(elements);
        assert!(matches!(
            packer.pack(&array),
            Err(CodecError::SizeOverflow { width: 2, size: 68_002 })
        ));

        let fits = MultiTypeArray::short((0..16_000).map(|_| raw(FIXED, b"zz")).collect());
        assert_eq!(packer.pack(&fits).unwrap().len(), 2 + 2 + 64_000);
    }

    const EMPTY: TypeCode = TypeCode::new(0x20, 0x09);

    fn packer_with_zero_width() -> Packer {
        let registry = Registry::builder()
            .with_arrays()
            .with(RawCreator::new(EMPTY, Framing::Fixed(0)))
            .build();
        Packer::new(Arc::new(registry))
    }

    #[test]
    fn test_typed_array_of_zero_width_elements_rejected_at_encode() {
        let packer = packer_with_zero_width();
        let array = TypedArray::byte(EMPTY, (0..3).map(|_| raw(EMPTY, b"")).collect()).unwrap();
        assert!(matches!(packer.pack(&array), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_typed_array_of_zero_width_elements_rejected_at_decode() {
        let packer = packer_with_zero_width();
        assert!(matches!(
            packer.deserialize(&[0x01, 0x01, 0x04, 0x20, 0x09, 0xff]),
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(
            packer.deserialize(&[0x01, 0x01, 0x03, 0x20, 0x09]),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_nested_arrays() {
        let packer = packer();
        let inner = MultiTypeArray::byte(vec![raw(SMALL, b"x")]);
        let outer = MultiTypeArray::short(vec![Box::new(inner.clone()), raw(FIXED, b"yy")]);
        let bytes = packer.pack(&outer).unwrap();
        let decoded = packer.deserialize(&bytes).unwrap().unwrap();
        let decoded = decoded.downcast_ref::<MultiTypeArray>().unwrap();
        assert_eq!(decoded, &outer);
        assert_eq!(decoded.of_kind::<MultiTypeArray>().next(), Some(&inner));
    }
}
