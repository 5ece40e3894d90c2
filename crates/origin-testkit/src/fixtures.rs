//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use origin_chain::{AddReport, NavigatorConfig, OriginChainNavigator, OriginChainState, Result};
use origin_core::{BoundWitness, BoundWitnessBuilder, Ed25519Signer, Registry, Sha256HashProvider};
use origin_store::MemoryStore;

/// Navigator over an in-memory store with SHA-256 hashing.
pub type MemoryNavigator = OriginChainNavigator<MemoryStore, Sha256HashProvider>;

/// A party with its own signer, chain state and navigator.
pub struct TestFixture {
    pub signer: Ed25519Signer,
    pub registry: Arc<Registry>,
    pub state: OriginChainState,
    pub navigator: MemoryNavigator,
}

impl TestFixture {
    /// Create a new test fixture with a random key.
    pub fn new() -> Self {
        Self::from_signer(Ed25519Signer::generate())
    }

    /// Create with a deterministic key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_signer(Ed25519Signer::from_seed(&seed))
    }

    fn from_signer(signer: Ed25519Signer) -> Self {
        let registry = Arc::new(Registry::standard());
        let navigator = OriginChainNavigator::new(
            registry.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(Sha256HashProvider),
            NavigatorConfig::default(),
        );
        Self {
            signer,
            registry,
            state: OriginChainState::new(),
            navigator,
        }
    }

    /// The next block of this party's chain, signed only by this party.
    pub fn make_block(&self) -> BoundWitness {
        BoundWitnessBuilder::new()
            .party(&[&self.signer], self.state.next_heuristics(), vec![])
            .build(&self.registry)
            .expect("single-party block always builds")
    }

    /// Build, store and record the next block.
    pub async fn append(&mut self) -> Result<AddReport> {
        let block = self.make_block();
        let report = self.navigator.add_bound_witness(&block).await?;
        self.state.record_block(report.hash.clone());
        Ok(report)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// A block bound by every fixture, each contributing its chain heuristics.
pub fn multi_party_block(parties: &[TestFixture]) -> BoundWitness {
    let registry = Registry::standard();
    parties
        .iter()
        .fold(BoundWitnessBuilder::new(), |builder, party| {
            builder.party(&[&party.signer], party.state.next_heuristics(), vec![])
        })
        .build(&registry)
        .expect("at least one party")
}
