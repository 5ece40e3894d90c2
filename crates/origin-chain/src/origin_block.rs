//! Chain-specific views of a bound witness.

use origin_core::{BoundWitness, HashValue, Index, PreviousHash};

/// Read the chain heuristics a block carries.
pub trait OriginBlock {
    /// The previous-block hash each party signed, in party order. `None`
    /// for parties whose signed heuristics carry no previous hash.
    fn find_previous_blocks(&self) -> Vec<Option<HashValue>>;

    /// The chain index each party signed, in party order.
    fn indexes(&self) -> Vec<Option<u32>>;
}

impl OriginBlock for BoundWitness {
    fn find_previous_blocks(&self) -> Vec<Option<HashValue>> {
        self.payloads()
            .iter()
            .map(|p| p.find_signed::<PreviousHash>().map(|prev| prev.hash().clone()))
            .collect()
    }

    fn indexes(&self) -> Vec<Option<u32>> {
        self.payloads()
            .iter()
            .map(|p| p.find_signed::<Index>().map(|i| i.0))
            .collect()
    }
}
