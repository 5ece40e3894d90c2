//! End-to-end navigator behavior over real stores.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use origin_chain::core::{
    BoundWitness, BoundWitnessBuilder, Ed25519Signer, Index, Packer, Registry, Sha256HashProvider,
};
use origin_chain::store::{MemoryStore, Priority, SqliteStore, StorageProvider, StoreError};
use origin_chain::{
    forward_link_key, ChainError, NavigatorConfig, OriginBlock, OriginChainNavigator,
    OriginChainState,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn navigator<S: StorageProvider>(store: Arc<S>) -> OriginChainNavigator<S, Sha256HashProvider> {
    OriginChainNavigator::new(
        Arc::new(Registry::standard()),
        store,
        Arc::new(Sha256HashProvider),
        NavigatorConfig::default(),
    )
}

fn next_block(registry: &Registry, signer: &Ed25519Signer, state: &OriginChainState) -> BoundWitness {
    BoundWitnessBuilder::new()
        .party(&[signer], state.next_heuristics(), vec![])
        .build(registry)
        .unwrap()
}

#[tokio::test]
async fn test_chain_linking() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let nav = navigator(store.clone());
    let registry = nav.packer().registry().clone();
    let signer = Ed25519Signer::from_seed(&[3; 32]);
    let mut state = OriginChainState::new();

    let b1 = next_block(&registry, &signer, &state);
    let r1 = nav.add_bound_witness(&b1).await.unwrap();
    assert!(r1.links.is_empty());
    state.record_block(r1.hash.clone());

    let b2 = next_block(&registry, &signer, &state);
    assert_eq!(b2.find_previous_blocks(), vec![Some(r1.hash.clone())]);
    let r2 = nav.add_bound_witness(&b2).await.unwrap();
    assert_eq!(r2.links.len(), 1);
    assert!(r2.all_links_ok());

    // 0xFF ++ hash(B1) -> hash(B2)
    let link = store.read(&forward_link_key(&r1.block_hash), Duration::from_secs(1)).await.unwrap();
    assert_eq!(link, Some(r2.block_hash.clone()));
    assert_eq!(nav.get_next_block_hash(&r1.block_hash).await.unwrap(), Some(r2.block_hash.clone()));

    // hash(B2) -> serialize(B2)
    let stored = store.read(&r2.block_hash, Duration::from_secs(1)).await.unwrap().unwrap();
    assert_eq!(stored.as_ref(), nav.packer().pack(&b2).unwrap().as_slice());
    assert_eq!(nav.get_origin_block(&r2.block_hash).await.unwrap(), Some(b2));

    // The key is the packed hash of exactly the stored bytes.
    let (_, rehash) = nav.hash_block(&b1).await.unwrap();
    assert_eq!(rehash, r1.hash);
    assert_eq!(r1.block_hash.as_ref(), nav.packer().pack(&r1.hash).unwrap().as_slice());

    assert_eq!(nav.get_next_block_hash(&r2.block_hash).await.unwrap(), None);
}

#[tokio::test]
async fn test_key_listing() {
    let store = Arc::new(MemoryStore::new());
    let nav = navigator(store);
    let registry = nav.packer().registry().clone();
    let signer = Ed25519Signer::from_seed(&[4; 32]);
    let mut state = OriginChainState::new();

    let mut hashes = Vec::new();
    for _ in 0..3 {
        let block = next_block(&registry, &signer, &state);
        let report = nav.add_bound_witness(&block).await.unwrap();
        state.record_block(report.hash.clone());
        hashes.push(report.block_hash);
    }

    let all = nav.get_all_origin_block_hashes().await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all.iter().filter(|k| k[0] == 0xff).count(), 2);

    let mut blocks = nav.get_block_hashes().await.unwrap();
    blocks.sort();
    hashes.sort();
    assert_eq!(blocks, hashes);
}

#[tokio::test]
async fn test_idempotent_removal() {
    let nav = navigator(Arc::new(MemoryStore::new()));
    let registry = nav.packer().registry().clone();
    let signer = Ed25519Signer::from_seed(&[5; 32]);

    let block = next_block(&registry, &signer, &OriginChainState::new());
    let report = nav.add_bound_witness(&block).await.unwrap();
    assert!(nav.contains_origin_block(&report.block_hash).await.unwrap());

    nav.remove_origin_block(&report.block_hash).await.unwrap();
    assert!(!nav.contains_origin_block(&report.block_hash).await.unwrap());
    nav.remove_origin_block(&report.block_hash).await.unwrap();
    assert_eq!(nav.get_origin_block(&report.block_hash).await.unwrap(), None);
}

#[tokio::test]
async fn test_removal_leaves_forward_link() {
    let store = Arc::new(MemoryStore::new());
    let nav = navigator(store.clone());
    let registry = nav.packer().registry().clone();
    let signer = Ed25519Signer::from_seed(&[6; 32]);
    let mut state = OriginChainState::new();

    let r1 = nav.add_bound_witness(&next_block(&registry, &signer, &state)).await.unwrap();
    state.record_block(r1.hash.clone());
    let r2 = nav.add_bound_witness(&next_block(&registry, &signer, &state)).await.unwrap();

    nav.remove_origin_block(&r1.block_hash).await.unwrap();
    assert_eq!(nav.get_next_block_hash(&r1.block_hash).await.unwrap(), Some(r2.block_hash));
}

/// Rejects every forward-link write.
#[derive(Default)]
struct LinkRejectingStore {
    inner: MemoryStore,
}

#[async_trait]
impl StorageProvider for LinkRejectingStore {
    async fn read(&self, key: &[u8], timeout: Duration) -> origin_chain::store::Result<Option<Bytes>> {
        self.inner.read(key, timeout).await
    }

    async fn write(
        &self,
        key: &[u8],
        value: &[u8],
        priority: Priority,
        overwrite: bool,
        timeout: Duration,
    ) -> origin_chain::store::Result<()> {
        if key.first() == Some(&0xff) {
            return Err(StoreError::Timeout(timeout));
        }
        self.inner.write(key, value, priority, overwrite, timeout).await
    }

    async fn delete(&self, key: &[u8]) -> origin_chain::store::Result<()> {
        self.inner.delete(key).await
    }

    async fn contains_key(&self, key: &[u8]) -> origin_chain::store::Result<bool> {
        self.inner.contains_key(key).await
    }

    async fn get_all_keys(&self) -> origin_chain::store::Result<Vec<Bytes>> {
        self.inner.get_all_keys().await
    }
}

#[tokio::test]
async fn test_failed_link_still_stores_block() {
    init_tracing();
    let nav = navigator(Arc::new(LinkRejectingStore::default()));
    let registry = nav.packer().registry().clone();
    let signer = Ed25519Signer::from_seed(&[7; 32]);
    let mut state = OriginChainState::new();

    let r1 = nav.add_bound_witness(&next_block(&registry, &signer, &state)).await.unwrap();
    state.record_block(r1.hash.clone());
    let r2 = nav.add_bound_witness(&next_block(&registry, &signer, &state)).await.unwrap();

    assert!(!r2.all_links_ok());
    let failed: Vec<_> = r2.failed_links().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].previous_hash, r1.block_hash);
    assert!(matches!(failed[0].result, Err(StoreError::Timeout(_))));

    assert!(nav.contains_origin_block(&r2.block_hash).await.unwrap());
    assert_eq!(nav.get_next_block_hash(&r1.block_hash).await.unwrap(), None);
}

#[tokio::test]
async fn test_primary_write_failure_is_error() {
    let store = Arc::new(MemoryStore::new());
    let nav = OriginChainNavigator::new(
        Arc::new(Registry::standard()),
        store,
        Arc::new(Sha256HashProvider),
        NavigatorConfig {
            overwrite: false,
            ..NavigatorConfig::default()
        },
    );
    let registry = nav.packer().registry().clone();
    let signer = Ed25519Signer::from_seed(&[8; 32]);
    let block = next_block(&registry, &signer, &OriginChainState::new());

    nav.add_bound_witness(&block).await.unwrap();
    let err = nav.add_bound_witness(&block).await.unwrap_err();
    assert!(matches!(err, ChainError::Store(StoreError::KeyExists(_))));
}

#[tokio::test]
async fn test_non_block_value_rejected() {
    let store = Arc::new(MemoryStore::new());
    let nav = navigator(store.clone());
    let index = nav.packer().pack(&Index(1)).unwrap();
    store
        .write(b"\x03\x05odd", &index, Priority::Low, true, Duration::from_secs(1))
        .await
        .unwrap();

    let err = nav.get_origin_block(b"\x03\x05odd").await.unwrap_err();
    assert!(matches!(err, ChainError::NotABlock(_)));
}

#[tokio::test]
async fn test_sqlite_chain() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chain.db");
    let signer = Ed25519Signer::from_seed(&[9; 32]);
    let registry = Registry::standard();
    let mut state = OriginChainState::new();

    let (first, second) = {
        let nav = navigator(Arc::new(SqliteStore::open(&path).unwrap()));
        let r1 = nav.add_bound_witness(&next_block(&registry, &signer, &state)).await.unwrap();
        state.record_block(r1.hash.clone());
        let r2 = nav.add_bound_witness(&next_block(&registry, &signer, &state)).await.unwrap();
        (r1.block_hash, r2.block_hash)
    };

    let nav = navigator(Arc::new(SqliteStore::open(&path).unwrap()));
    assert_eq!(nav.get_next_block_hash(&first).await.unwrap(), Some(second.clone()));
    let block = nav.get_origin_block(&second).await.unwrap().unwrap();
    assert_eq!(block.indexes(), vec![Some(1)]);
    assert!(block.verify_ed25519(&registry).unwrap());
}

#[test]
fn test_two_element_short_array_scenario() {
    use origin_chain::core::{
        ArrayCreator, ArrayLayout, Framing, MultiTypeArray, RawCreator, RawValue, SizeWidth,
        TypeCode,
    };

    // 01 05 re-registered as an opaque kind; the array gets a code of its own.
    let elem = TypeCode::new(0x01, 0x05);
    let array_code = TypeCode::new(0x20, 0x05);
    let registry = Registry::builder()
        .with_standard_kinds()
        .with(RawCreator::new(elem, Framing::Prefixed(SizeWidth::One)))
        .with(ArrayCreator::new(array_code, SizeWidth::Two, ArrayLayout::MultiType))
        .build();
    let packer = Packer::new(Arc::new(registry));

    let array = MultiTypeArray::new(
        array_code,
        vec![
            Box::new(RawValue::new(elem, &b"A"[..])),
            Box::new(RawValue::new(elem, &b"B"[..])),
        ],
    );
    let bytes = packer
        .serialize(&array, array_code.major, array_code.minor, false)
        .unwrap();
    assert_eq!(
        bytes,
        vec![0x00, 0x0a, 0x01, 0x05, 0x02, b'A', 0x01, 0x05, 0x02, b'B']
    );

    let tagged = packer.pack(&array).unwrap();
    let decoded = packer.deserialize(&tagged).unwrap().unwrap();
    let decoded = decoded.downcast_ref::<MultiTypeArray>().unwrap();
    let payloads: Vec<_> = decoded
        .of_kind::<RawValue>()
        .map(|v| v.payload().clone())
        .collect();
    assert_eq!(payloads, vec![Bytes::from_static(b"A"), Bytes::from_static(b"B")]);
}
