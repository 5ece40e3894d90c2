//! Golden wire vectors.
//!
//! Each vector pins the exact packed bytes of a value so any implementation
//! of the format can be checked against it.

use std::sync::Arc;

use serde::Serialize;

use origin_core::array::codes as array_codes;
use origin_core::hash::codes as hash_codes;
use origin_core::{
    HashValue, Index, MultiTypeArray, Packer, Payload, PreviousHash, Registry, TypedArray,
    TypedValue,
};

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Expected packed bytes (hex).
    pub expected_hex: &'static str,
    #[serde(skip)]
    pub build: fn() -> Box<dyn TypedValue>,
}

/// Result of checking one vector.
#[derive(Debug, Clone, Serialize)]
pub struct VectorResult {
    pub name: String,
    pub matches: bool,
    pub actual_hex: String,
}

fn sha256_abc() -> HashValue {
    HashValue::new(
        hash_codes::SHA256,
        hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
            .expect("static hex"),
    )
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "index one",
            expected_hex: "020500000001",
            build: || Box::new(Index(1)),
        },
        GoldenVector {
            name: "empty short multi-type array",
            expected_hex: "01050002",
            build: || Box::new(MultiTypeArray::short(vec![])),
        },
        GoldenVector {
            name: "byte typed array of two indexes",
            expected_hex: "01010b02050000000100000002",
            build: || {
                Box::new(
                    TypedArray::byte(
                        Index(0).type_code(),
                        vec![Box::new(Index(1)), Box::new(Index(2))],
                    )
                    .expect("uniform elements"),
                )
            },
        },
        GoldenVector {
            name: "sha256 of abc",
            expected_hex: "0305ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            build: || Box::new(sha256_abc()),
        },
        GoldenVector {
            name: "previous hash",
            expected_hex: "0206230305ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            build: || Box::new(PreviousHash(sha256_abc())),
        },
        GoldenVector {
            name: "payload with genesis index",
            expected_hex: "02040000001601060000000a020500000000010600000004",
            build: || Box::new(Payload::new(vec![Box::new(Index(0))], vec![])),
        },
        GoldenVector {
            name: "empty key set",
            expected_hex: "02020002",
            build: || Box::new(MultiTypeArray::new(array_codes::KEY_SET, vec![])),
        },
    ]
}

/// Pack every vector and compare against its expected bytes.
pub fn verify_all_vectors() -> Vec<VectorResult> {
    let packer = Packer::new(Arc::new(Registry::standard()));
    all_vectors()
        .iter()
        .map(|v| {
            let value = (v.build)();
            let actual_hex = packer
                .pack(value.as_ref())
                .map(hex::encode)
                .unwrap_or_else(|e| format!("error: {}", e));
            VectorResult {
                name: v.name.to_string(),
                matches: actual_hex == v.expected_hex,
                actual_hex,
            }
        })
        .collect()
}

/// Dump the vectors as JSON, for consumption by other implementations.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}
