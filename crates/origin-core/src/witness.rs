//! Bound witness: the signed unit an origin chain is made of.
//!
//! ```text
//! BoundWitness := 02 01 size(u32) keySets payloads signatureSets
//!   keySets       := 01 06 size(u32) KeySet*          (one per party)
//!   payloads      := 01 06 size(u32) Payload*         (one per party)
//!   signatureSets := 01 06 size(u32) SignatureSet*    (one per party)
//! Payload      := 02 04 size(u32) signed:MultiTypeArrayInt unsigned:MultiTypeArrayInt
//! ```
//!
//! Every party signs the same message: the packed key sets followed by each
//! party's packed signed heuristics.

use crate::array::{codes as array_codes, MultiTypeArray};
use crate::codec;
use crate::crypto::{Ed25519PublicKey, Ed25519Signature, Signer};
use crate::cursor::Reader;
use crate::error::{CodecError, Result, WitnessError};
use crate::hash::HashValue;
use crate::object::{read_fixed_u32, TypedValue};
use crate::registry::{Creator, Registry};
use crate::types::{Framing, SizeWidth, TypeCode};

/// Bound witness type codes.
pub mod codes {
    use crate::types::TypeCode;

    pub const BOUND_WITNESS: TypeCode = TypeCode::new(0x02, 0x01);
    pub const PAYLOAD: TypeCode = TypeCode::new(0x02, 0x04);
    pub const INDEX: TypeCode = TypeCode::new(0x02, 0x05);
    pub const PREVIOUS_HASH: TypeCode = TypeCode::new(0x02, 0x06);
}

/// Position of a block within its origin chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index(pub u32);

impl TypedValue for Index {
    fn type_code(&self) -> TypeCode {
        codes::INDEX
    }

    fn write_body(&self, _registry: &Registry, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.0.to_be_bytes());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexCreator;

impl Creator for IndexCreator {
    fn type_code(&self) -> TypeCode {
        codes::INDEX
    }

    fn framing(&self) -> Framing {
        Framing::Fixed(4)
    }

    fn create_from_packed(&self, body: &[u8], _registry: &Registry) -> Result<Box<dyn TypedValue>> {
        Ok(Box::new(Index(read_fixed_u32(body)?)))
    }
}

/// Reference to the hash of the block this one follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousHash(pub HashValue);

impl PreviousHash {
    pub fn hash(&self) -> &HashValue {
        &self.0
    }
}

impl TypedValue for PreviousHash {
    fn type_code(&self) -> TypeCode {
        codes::PREVIOUS_HASH
    }

    fn write_body(&self, registry: &Registry, out: &mut Vec<u8>) -> Result<()> {
        codec::write_value(registry, &self.0, true, out)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PreviousHashCreator;

impl Creator for PreviousHashCreator {
    fn type_code(&self) -> TypeCode {
        codes::PREVIOUS_HASH
    }

    fn framing(&self) -> Framing {
        Framing::Prefixed(SizeWidth::One)
    }

    fn create_from_packed(&self, body: &[u8], registry: &Registry) -> Result<Box<dyn TypedValue>> {
        let mut reader = Reader::new(body);
        let hash = codec::read_tagged_as::<HashValue>(registry, &mut reader)?;
        reader.finish()?;
        Ok(Box::new(PreviousHash(hash)))
    }
}

/// One party's heuristics: a signed part and an unsigned part.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    signed: MultiTypeArray,
    unsigned: MultiTypeArray,
}

impl Payload {
    pub fn new(signed: Vec<Box<dyn TypedValue>>, unsigned: Vec<Box<dyn TypedValue>>) -> Self {
        Self {
            signed: MultiTypeArray::int(signed),
            unsigned: MultiTypeArray::int(unsigned),
        }
    }

    pub fn signed(&self) -> &MultiTypeArray {
        &self.signed
    }

    pub fn unsigned(&self) -> &MultiTypeArray {
        &self.unsigned
    }

    /// First signed heuristic that is a `T`.
    pub fn find_signed<T: TypedValue>(&self) -> Option<&T> {
        self.signed.of_kind::<T>().next()
    }
}

impl TypedValue for Payload {
    fn type_code(&self) -> TypeCode {
        codes::PAYLOAD
    }

    fn write_body(&self, registry: &Registry, out: &mut Vec<u8>) -> Result<()> {
        codec::write_value(registry, &self.signed, true, out)?;
        codec::write_value(registry, &self.unsigned, true, out)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadCreator;

impl Creator for PayloadCreator {
    fn type_code(&self) -> TypeCode {
        codes::PAYLOAD
    }

    fn framing(&self) -> Framing {
        Framing::Prefixed(SizeWidth::Four)
    }

    fn create_from_packed(&self, body: &[u8], registry: &Registry) -> Result<Box<dyn TypedValue>> {
        let mut reader = Reader::new(body);
        let signed = codec::read_tagged_as::<MultiTypeArray>(registry, &mut reader)?;
        let unsigned = codec::read_tagged_as::<MultiTypeArray>(registry, &mut reader)?;
        reader.finish()?;
        Ok(Box::new(Payload { signed, unsigned }))
    }
}

/// A block of an origin chain: key sets, payloads and signature sets, one of
/// each per party.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundWitness {
    key_sets: Vec<MultiTypeArray>,
    payloads: Vec<Payload>,
    signature_sets: Vec<MultiTypeArray>,
}

impl BoundWitness {
    /// Assemble from parts. All three lists must have one entry per party.
    pub fn from_parts(
        key_sets: Vec<MultiTypeArray>,
        payloads: Vec<Payload>,
        signature_sets: Vec<MultiTypeArray>,
    ) -> Result<Self> {
        if key_sets.len() != payloads.len() || payloads.len() != signature_sets.len() {
            return Err(CodecError::Malformed(format!(
                "party count mismatch: {} key sets, {} payloads, {} signature sets",
                key_sets.len(),
                payloads.len(),
                signature_sets.len()
            )));
        }
        if let Some(set) = key_sets.iter().find(|s| s.type_code() != array_codes::KEY_SET) {
            return Err(CodecError::Malformed(format!(
                "expected key set, found {}",
                set.type_code()
            )));
        }
        if let Some(set) = signature_sets
            .iter()
            .find(|s| s.type_code() != array_codes::SIGNATURE_SET)
        {
            return Err(CodecError::Malformed(format!(
                "expected signature set, found {}",
                set.type_code()
            )));
        }
        Ok(Self {
            key_sets,
            payloads,
            signature_sets,
        })
    }

    pub fn key_sets(&self) -> &[MultiTypeArray] {
        &self.key_sets
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    pub fn signature_sets(&self) -> &[MultiTypeArray] {
        &self.signature_sets
    }

    pub fn party_count(&self) -> usize {
        self.payloads.len()
    }

    /// The bytes every party signs.
    pub fn signing_data(&self, registry: &Registry) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        write_group(registry, self.key_sets.iter().map(as_typed), &mut out)?;
        for payload in &self.payloads {
            codec::write_value(registry, payload.signed(), true, &mut out)?;
        }
        Ok(out)
    }

    /// Check every Ed25519 signature against the key at the same position.
    ///
    /// Returns `false` if any pair fails or if a party has mismatched counts.
    /// Keys and signatures of other algorithms are skipped.
    pub fn verify_ed25519(&self, registry: &Registry) -> Result<bool> {
        let message = self.signing_data(registry)?;
        for (keys, signatures) in self.key_sets.iter().zip(&self.signature_sets) {
            let keys: Vec<&Ed25519PublicKey> = keys.of_kind().collect();
            let signatures: Vec<&Ed25519Signature> = signatures.of_kind().collect();
            if keys.len() != signatures.len() {
                return Ok(false);
            }
            if !keys
                .iter()
                .zip(&signatures)
                .all(|(key, sig)| key.verify(&message, sig))
            {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn as_typed<T: TypedValue>(value: &T) -> &dyn TypedValue {
    value
}

/// Write `items` as one 4-byte-prefixed multi-type array.
fn write_group<'a>(
    registry: &Registry,
    items: impl Iterator<Item = &'a dyn TypedValue>,
    out: &mut Vec<u8>,
) -> Result<()> {
    codec::write_frame(registry, array_codes::MULTI_TYPE_ARRAY_INT, true, out, |out| {
        for item in items {
            codec::write_value(registry, item, true, out)?;
        }
        Ok(())
    })
}

impl TypedValue for BoundWitness {
    fn type_code(&self) -> TypeCode {
        codes::BOUND_WITNESS
    }

    fn write_body(&self, registry: &Registry, out: &mut Vec<u8>) -> Result<()> {
        write_group(registry, self.key_sets.iter().map(as_typed), out)?;
        write_group(registry, self.payloads.iter().map(as_typed), out)?;
        write_group(registry, self.signature_sets.iter().map(as_typed), out)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundWitnessCreator;

impl BoundWitnessCreator {
    fn read_group<T: TypedValue>(registry: &Registry, reader: &mut Reader<'_>) -> Result<Vec<T>> {
        let group = codec::read_tagged_as::<MultiTypeArray>(registry, reader)?;
        group
            .into_elements()
            .into_iter()
            .map(codec::expect_kind::<T>)
            .collect()
    }
}

impl Creator for BoundWitnessCreator {
    fn type_code(&self) -> TypeCode {
        codes::BOUND_WITNESS
    }

    fn framing(&self) -> Framing {
        Framing::Prefixed(SizeWidth::Four)
    }

    fn create_from_packed(&self, body: &[u8], registry: &Registry) -> Result<Box<dyn TypedValue>> {
        let mut reader = Reader::new(body);
        let key_sets = Self::read_group::<MultiTypeArray>(registry, &mut reader)?;
        let payloads = Self::read_group::<Payload>(registry, &mut reader)?;
        let signature_sets = Self::read_group::<MultiTypeArray>(registry, &mut reader)?;
        reader.finish()?;
        Ok(Box::new(BoundWitness::from_parts(
            key_sets,
            payloads,
            signature_sets,
        )?))
    }
}

/// Assembles and signs a [`BoundWitness`] whose parties are all local.
#[derive(Default)]
pub struct BoundWitnessBuilder<'s> {
    parties: Vec<Party<'s>>,
}

struct Party<'s> {
    signers: Vec<&'s dyn Signer>,
    signed: Vec<Box<dyn TypedValue>>,
    unsigned: Vec<Box<dyn TypedValue>>,
}

impl<'s> BoundWitnessBuilder<'s> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a party with its signers and heuristics.
    pub fn party(
        mut self,
        signers: &[&'s dyn Signer],
        signed: Vec<Box<dyn TypedValue>>,
        unsigned: Vec<Box<dyn TypedValue>>,
    ) -> Self {
        self.parties.push(Party {
            signers: signers.to_vec(),
            signed,
            unsigned,
        });
        self
    }

    /// Sign and assemble.
    pub fn build(self, registry: &Registry) -> std::result::Result<BoundWitness, WitnessError> {
        if self.parties.is_empty() {
            return Err(WitnessError::NoParties);
        }

        let mut key_sets = Vec::with_capacity(self.parties.len());
        let mut payloads = Vec::with_capacity(self.parties.len());
        let mut signers = Vec::with_capacity(self.parties.len());
        for party in self.parties {
            key_sets.push(MultiTypeArray::key_set(
                party.signers.iter().map(|s| s.public_key()).collect(),
            ));
            payloads.push(Payload::new(party.signed, party.unsigned));
            signers.push(party.signers);
        }

        let unsigned = BoundWitness {
            key_sets,
            payloads,
            signature_sets: Vec::new(),
        };
        let message = unsigned.signing_data(registry)?;

        let mut signature_sets = Vec::with_capacity(signers.len());
        for party in &signers {
            let signatures = party
                .iter()
                .map(|s| s.sign(&message))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            signature_sets.push(MultiTypeArray::signature_set(signatures));
        }

        Ok(BoundWitness {
            signature_sets,
            ..unsigned
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Packer;
    use crate::crypto::Ed25519Signer;
    use crate::hash::codes as hash_codes;
    use std::sync::Arc;

    fn packer() -> Packer {
        Packer::new(Arc::new(Registry::standard()))
    }

    fn previous() -> PreviousHash {
        PreviousHash(HashValue::new(hash_codes::SHA256, vec![0xab; 32]))
    }

    #[test]
    fn test_index_wire_form() {
        let packer = packer();
        let bytes = packer.pack(&Index(258)).unwrap();
        assert_eq!(bytes, vec![0x02, 0x05, 0x00, 0x00, 0x01, 0x02]);
        let decoded = packer.deserialize(&bytes).unwrap().unwrap();
        assert_eq!(decoded.downcast_ref::<Index>(), Some(&Index(258)));
    }

    #[test]
    fn test_previous_hash_wire_form() {
        let packer = packer();
        let bytes = packer.pack(&previous()).unwrap();
        // tag, 1-byte size (1 + 34), tagged sha256
        assert_eq!(&bytes[..5], &[0x02, 0x06, 35, 0x03, 0x05]);
        assert_eq!(bytes.len(), 2 + 35);
        let decoded = packer.deserialize(&bytes).unwrap().unwrap();
        assert_eq!(decoded.downcast_ref::<PreviousHash>(), Some(&previous()));
    }

    #[test]
    fn test_build_and_verify() {
        let registry = Registry::standard();
        let alice = Ed25519Signer::from_seed(&[1; 32]);
        let bob = Ed25519Signer::from_seed(&[2; 32]);

        let witness = BoundWitnessBuilder::new()
            .party(&[&alice], vec![Box::new(Index(0))], vec![])
            .party(
                &[&bob],
                vec![Box::new(Index(7)), Box::new(previous())],
                vec![Box::new(Index(99))],
            )
            .build(&registry)
            .unwrap();

        assert_eq!(witness.party_count(), 2);
        assert_eq!(witness.signature_sets()[0].len(), 1);
        assert!(witness.verify_ed25519(&registry).unwrap());
        assert_eq!(
            witness.payloads()[1].find_signed::<PreviousHash>(),
            Some(&previous())
        );
    }

    #[test]
    fn test_tampered_witness_fails_verification() {
        let registry = Registry::standard();
        let alice = Ed25519Signer::from_seed(&[1; 32]);
        let witness = BoundWitnessBuilder::new()
            .party(&[&alice], vec![Box::new(Index(0))], vec![])
            .build(&registry)
            .unwrap();

        let tampered = BoundWitness::from_parts(
            witness.key_sets().to_vec(),
            vec![Payload::new(vec![Box::new(Index(1))], vec![])],
            witness.signature_sets().to_vec(),
        )
        .unwrap();
        assert!(!tampered.verify_ed25519(&registry).unwrap());
    }

    #[test]
    fn test_bound_witness_roundtrip() {
        let packer = packer();
        let signer = Ed25519Signer::from_seed(&[9; 32]);
        let witness = BoundWitnessBuilder::new()
            .party(
                &[&signer],
                vec![Box::new(Index(3)), Box::new(previous())],
                vec![],
            )
            .build(packer.registry())
            .unwrap();

        let bytes = packer.pack(&witness).unwrap();
        assert_eq!(&bytes[..2], &[0x02, 0x01]);
        let declared = u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]) as usize;
        assert_eq!(declared, bytes.len() - 2);

        let decoded = packer.deserialize(&bytes).unwrap().unwrap();
        let decoded = decoded.downcast_ref::<BoundWitness>().unwrap();
        assert_eq!(decoded, &witness);
        assert!(decoded.verify_ed25519(packer.registry()).unwrap());
    }

    #[test]
    fn test_builder_requires_party() {
        let registry = Registry::standard();
        assert!(matches!(
            BoundWitnessBuilder::new().build(&registry),
            Err(WitnessError::NoParties)
        ));
    }

    #[test]
    fn test_party_count_mismatch_rejected() {
        let result = BoundWitness::from_parts(
            vec![MultiTypeArray::key_set(vec![])],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(CodecError::Malformed(_))));
    }
}
