//! Every backend must satisfy the same storage contract.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use origin_store::{MemoryStore, Priority, SqliteStore, StorageProvider, StoreError};

const T: Duration = Duration::from_secs(5);

async fn check_contract<S: StorageProvider>(store: &S) {
    // Absent keys.
    assert_eq!(store.read(b"missing", T).await.unwrap(), None);
    assert!(!store.contains_key(b"missing").await.unwrap());
    store.delete(b"missing").await.unwrap();

    // Write then read.
    store.write(b"\x03\x05a", b"one", Priority::Medium, true, T).await.unwrap();
    assert_eq!(store.read(b"\x03\x05a", T).await.unwrap(), Some(Bytes::from_static(b"one")));

    // Overwrite policy.
    assert!(matches!(
        store.write(b"\x03\x05a", b"two", Priority::High, false, T).await,
        Err(StoreError::KeyExists(_))
    ));
    store.write(b"\x03\x05a", b"two", Priority::High, true, T).await.unwrap();
    assert_eq!(store.read(b"\x03\x05a", T).await.unwrap(), Some(Bytes::from_static(b"two")));

    // Empty values are values.
    store.write(b"\xff\x03\x05a", b"", Priority::Low, true, T).await.unwrap();
    assert_eq!(store.read(b"\xff\x03\x05a", T).await.unwrap(), Some(Bytes::new()));

    // Byte-ordered listing.
    store.write(b"\x00", b"z", Priority::Low, true, T).await.unwrap();
    let keys = store.get_all_keys().await.unwrap();
    assert_eq!(
        keys,
        vec![
            Bytes::from_static(b"\x00"),
            Bytes::from_static(b"\x03\x05a"),
            Bytes::from_static(b"\xff\x03\x05a"),
        ]
    );

    // Idempotent delete.
    store.delete(b"\x03\x05a").await.unwrap();
    store.delete(b"\x03\x05a").await.unwrap();
    assert!(!store.contains_key(b"\x03\x05a").await.unwrap());
    assert_eq!(store.get_all_keys().await.unwrap().len(), 2);
}

async fn check_concurrent_writes<S: StorageProvider + 'static>(store: Arc<S>) {
    let mut handles = Vec::new();
    for i in 0u8..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.write(&[i], &[i; 4], Priority::Medium, false, T).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(store.get_all_keys().await.unwrap().len(), 16);
}

#[tokio::test]
async fn test_memory_contract() {
    check_contract(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_memory_contract() {
    check_contract(&SqliteStore::open_memory().unwrap()).await;
}

#[tokio::test]
async fn test_sqlite_file_contract() {
    let dir = tempfile::tempdir().unwrap();
    check_contract(&SqliteStore::open(dir.path().join("contract.db")).unwrap()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes() {
    check_concurrent_writes(Arc::new(MemoryStore::new())).await;
    check_concurrent_writes(Arc::new(SqliteStore::open_memory().unwrap())).await;
}
