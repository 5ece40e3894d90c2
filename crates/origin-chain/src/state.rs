//! Local origin chain state: where the next block goes.

use origin_core::{HashValue, Index, PreviousHash, TypedValue};

/// Tracks the local party's position in its own origin chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginChainState {
    /// Index the next block will carry.
    pub index: u32,
    /// Hash of the most recent block, `None` before the genesis block.
    pub latest_hash: Option<HashValue>,
}

impl OriginChainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signed heuristics for the next block: its index, and the previous
    /// hash once a block has been recorded.
    pub fn next_heuristics(&self) -> Vec<Box<dyn TypedValue>> {
        let mut heuristics: Vec<Box<dyn TypedValue>> = vec![Box::new(Index(self.index))];
        if let Some(hash) = &self.latest_hash {
            heuristics.push(Box::new(PreviousHash(hash.clone())));
        }
        heuristics
    }

    /// Advance past a committed block.
    pub fn record_block(&mut self, hash: HashValue) {
        self.index = self.index.saturating_add(1);
        self.latest_hash = Some(hash);
    }

    pub fn is_genesis(&self) -> bool {
        self.latest_hash.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use origin_core::hash::codes;

    #[test]
    fn test_genesis_has_no_previous() {
        let state = OriginChainState::new();
        assert!(state.is_genesis());
        let heuristics = state.next_heuristics();
        assert_eq!(heuristics.len(), 1);
        assert_eq!(heuristics[0].downcast_ref::<Index>(), Some(&Index(0)));
    }

    #[test]
    fn test_record_block_advances() {
        let mut state = OriginChainState::new();
        let hash = HashValue::new(codes::SHA256, vec![1; 32]);
        state.record_block(hash.clone());

        assert_eq!(state.index, 1);
        let heuristics = state.next_heuristics();
        assert_eq!(heuristics.len(), 2);
        assert_eq!(
            heuristics[1].downcast_ref::<PreviousHash>(),
            Some(&PreviousHash(hash))
        );
    }
}
