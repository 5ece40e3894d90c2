//! Proptest generators for property-based testing.
//!
//! Raw values use test-only codes under major `0x20`; [`test_registry`]
//! knows them alongside the standard kinds.

use proptest::prelude::*;

use origin_core::hash::codes as hash_codes;
use origin_core::{
    BoundWitness, BoundWitnessBuilder, Ed25519Signer, Framing, HashValue, Index, MultiTypeArray,
    PreviousHash, RawCreator, RawValue, Registry, SizeWidth, TypeCode, TypedValue,
};

/// Fixed 8-byte raw value.
pub const RAW_FIXED: TypeCode = TypeCode::new(0x20, 0x01);
/// Raw value with a 1-byte size prefix.
pub const RAW_BYTE: TypeCode = TypeCode::new(0x20, 0x02);
/// Raw value with a 2-byte size prefix.
pub const RAW_SHORT: TypeCode = TypeCode::new(0x20, 0x03);
/// Raw value with a 4-byte size prefix.
pub const RAW_INT: TypeCode = TypeCode::new(0x20, 0x04);

/// Standard kinds plus the raw test codes.
pub fn test_registry() -> Registry {
    Registry::builder()
        .with_standard_kinds()
        .with(RawCreator::new(RAW_FIXED, Framing::Fixed(8)))
        .with(RawCreator::new(RAW_BYTE, Framing::Prefixed(SizeWidth::One)))
        .with(RawCreator::new(RAW_SHORT, Framing::Prefixed(SizeWidth::Two)))
        .with(RawCreator::new(RAW_INT, Framing::Prefixed(SizeWidth::Four)))
        .build()
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a raw value under one of the test codes.
pub fn raw_value() -> impl Strategy<Value = RawValue> {
    prop_oneof![
        any::<[u8; 8]>().prop_map(|b| RawValue::new(RAW_FIXED, b.to_vec())),
        payload(64).prop_map(|p| RawValue::new(RAW_BYTE, p)),
        payload(100).prop_map(|p| RawValue::new(RAW_SHORT, p)),
        payload(100).prop_map(|p| RawValue::new(RAW_INT, p)),
    ]
}

/// Generate a SHA-256 or BLAKE3 hash value.
pub fn hash_value() -> impl Strategy<Value = HashValue> {
    (any::<bool>(), any::<[u8; 32]>()).prop_map(|(sha, digest)| {
        let code = if sha {
            hash_codes::SHA256
        } else {
            hash_codes::BLAKE3
        };
        HashValue::new(code, digest.to_vec())
    })
}

/// Generate any leaf value: raw, index, hash or previous hash.
pub fn leaf_value() -> impl Strategy<Value = Box<dyn TypedValue>> {
    prop_oneof![
        raw_value().prop_map(|v| Box::new(v) as Box<dyn TypedValue>),
        any::<u32>().prop_map(|i| Box::new(Index(i)) as Box<dyn TypedValue>),
        hash_value().prop_map(|h| Box::new(h) as Box<dyn TypedValue>),
        hash_value().prop_map(|h| Box::new(PreviousHash(h)) as Box<dyn TypedValue>),
    ]
}

/// Generate nested multi-type arrays of leaf values.
///
/// Uses 2- and 4-byte prefixes only, with sizes kept well under 64 KiB.
pub fn multi_type_array() -> impl Strategy<Value = MultiTypeArray> {
    let leaf = prop::collection::vec(leaf_value(), 0..5)
        .prop_map(MultiTypeArray::int)
        .boxed();
    leaf.prop_recursive(2, 32, 5, |inner| {
        (
            any::<bool>(),
            prop::collection::vec(
                prop_oneof![
                    leaf_value(),
                    inner.prop_map(|a| Box::new(a) as Box<dyn TypedValue>),
                ],
                0..5,
            ),
        )
            .prop_map(|(short, elements)| {
                if short {
                    MultiTypeArray::short(elements)
                } else {
                    MultiTypeArray::int(elements)
                }
            })
    })
}

/// Parameters for generating a single-party block.
#[derive(Debug, Clone)]
pub struct BlockParams {
    pub seed: [u8; 32],
    pub index: u32,
    pub previous: Option<HashValue>,
    pub unsigned: Vec<RawValue>,
}

impl Arbitrary for BlockParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            any::<u32>(),
            proptest::option::of(hash_value()),
            prop::collection::vec(raw_value(), 0..4),
        )
            .prop_map(|(seed, index, previous, unsigned)| BlockParams {
                seed,
                index,
                previous,
                unsigned,
            })
            .boxed()
    }
}

/// Generate a block from parameters.
pub fn block_from_params(params: &BlockParams, registry: &Registry) -> BoundWitness {
    let signer = Ed25519Signer::from_seed(&params.seed);
    let mut signed: Vec<Box<dyn TypedValue>> = vec![Box::new(Index(params.index))];
    if let Some(prev) = &params.previous {
        signed.push(Box::new(PreviousHash(prev.clone())));
    }
    let unsigned = params
        .unsigned
        .iter()
        .map(|v| Box::new(v.clone()) as Box<dyn TypedValue>)
        .collect();

    BoundWitnessBuilder::new()
        .party(&[&signer], signed, unsigned)
        .build(registry)
        .expect("single-party block always builds")
}
