//! The navigator: persists blocks and the forward links between them.
//!
//! Storage layout:
//!
//! ```text
//! packed(hash(B))         -> packed(B)          primary entry
//! 0xFF ++ packed(hash(A)) -> packed(hash(B))    forward link, A precedes B
//! ```
//!
//! Hash keys are packed typed hash values, so the algorithm is part of the
//! key. Packed hashes never start with `0xFF`, which keeps link keys apart
//! from block keys.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use tracing::{debug, info, warn};

use origin_core::{BoundWitness, HashProvider, HashValue, Packer, Registry};
use origin_store::{StorageProvider, StoreError};

use crate::config::NavigatorConfig;
use crate::error::{ChainError, Result};
use crate::origin_block::OriginBlock;

/// Prefix byte of forward-link keys.
pub const FORWARD_LINK_PREFIX: u8 = 0xFF;

/// Key of the forward link out of the block whose packed hash is `block_hash`.
pub fn forward_link_key(block_hash: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + block_hash.len());
    key.push(FORWARD_LINK_PREFIX);
    key.extend_from_slice(block_hash);
    key
}

/// Outcome of one forward-link write.
#[derive(Debug)]
pub struct LinkOutcome {
    /// Packed hash of the previous block the link leaves from.
    pub previous_hash: Bytes,
    pub result: std::result::Result<(), StoreError>,
}

/// What `add_bound_witness` stored.
#[derive(Debug)]
pub struct AddReport {
    /// Packed hash of the block: its storage key.
    pub block_hash: Bytes,
    pub hash: HashValue,
    /// One entry per previous hash the block referenced.
    pub links: Vec<LinkOutcome>,
}

impl AddReport {
    pub fn all_links_ok(&self) -> bool {
        self.links.iter().all(|l| l.result.is_ok())
    }

    pub fn failed_links(&self) -> impl Iterator<Item = &LinkOutcome> {
        self.links.iter().filter(|l| l.result.is_err())
    }
}

/// Stores bound witnesses keyed by hash and links each to its successors.
///
/// Generic over the storage and hash capabilities; holds no chain state of
/// its own, so one navigator may serve any number of chains.
pub struct OriginChainNavigator<S: StorageProvider, H: HashProvider> {
    packer: Packer,
    store: Arc<S>,
    hasher: Arc<H>,
    config: NavigatorConfig,
}

impl<S: StorageProvider, H: HashProvider> OriginChainNavigator<S, H> {
    pub fn new(registry: Arc<Registry>, store: Arc<S>, hasher: Arc<H>, config: NavigatorConfig) -> Self {
        Self {
            packer: Packer::new(registry),
            store,
            hasher,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn packer(&self) -> &Packer {
        &self.packer
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Hash a block the way `add_bound_witness` keys it.
    ///
    /// Returns the packed block and its hash.
    pub async fn hash_block(&self, block: &BoundWitness) -> Result<(Vec<u8>, HashValue)> {
        let block_data = self.packer.pack(block)?;
        let hash = self.hasher.compute(&block_data).await?;
        Ok((block_data, hash))
    }

    /// Store `block` and link every block it references to it.
    ///
    /// Forward links are written concurrently and settle before the block
    /// itself is written. A failed link does not stop the primary write; it
    /// is logged and reported in the returned [`AddReport`]. `Err` means the
    /// block was not stored.
    pub async fn add_bound_witness(&self, block: &BoundWitness) -> Result<AddReport> {
        let (block_data, hash) = self.hash_block(block).await?;
        let block_hash = Bytes::from(self.packer.pack(&hash)?);

        let previous = block
            .find_previous_blocks()
            .into_iter()
            .flatten()
            .map(|prev| self.packer.pack(&prev).map(Bytes::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let priority = self.config.write_priority;
        let overwrite = self.config.overwrite;
        let timeout = self.config.write_timeout();

        let link_writes = previous.iter().map(|prev| {
            let key = forward_link_key(prev);
            let value = &block_hash;
            async move {
                self.store
                    .write(&key, value, priority, overwrite, timeout)
                    .await
            }
        });
        let results = join_all(link_writes).await;

        let links: Vec<LinkOutcome> = previous
            .into_iter()
            .zip(results)
            .map(|(previous_hash, result)| {
                if let Err(e) = &result {
                    warn!(
                        previous = %hex_prefix(&previous_hash),
                        block = %hash,
                        error = %e,
                        "forward link write failed"
                    );
                }
                LinkOutcome {
                    previous_hash,
                    result,
                }
            })
            .collect();

        self.store
            .write(&block_hash, &block_data, priority, overwrite, timeout)
            .await?;

        info!(
            block = %hash,
            size = block_data.len(),
            links = links.len(),
            "origin block committed"
        );

        Ok(AddReport {
            block_hash,
            hash,
            links,
        })
    }

    /// Delete the block stored under `block_hash`.
    ///
    /// Forward links into or out of it are left in place. Removing an absent
    /// block succeeds.
    pub async fn remove_origin_block(&self, block_hash: &[u8]) -> Result<()> {
        debug!(block = %hex_prefix(block_hash), "removing origin block");
        self.store.delete(block_hash).await?;
        Ok(())
    }

    pub async fn contains_origin_block(&self, block_hash: &[u8]) -> Result<bool> {
        Ok(self.store.contains_key(block_hash).await?)
    }

    /// Every stored key, forward-link keys included.
    pub async fn get_all_origin_block_hashes(&self) -> Result<Vec<Bytes>> {
        Ok(self.store.get_all_keys().await?)
    }

    /// Stored keys that name blocks, forward-link keys excluded.
    pub async fn get_block_hashes(&self) -> Result<Vec<Bytes>> {
        let mut keys = self.store.get_all_keys().await?;
        keys.retain(|k| k.first() != Some(&FORWARD_LINK_PREFIX));
        Ok(keys)
    }

    /// Read and decode the block stored under `block_hash`.
    pub async fn get_origin_block(&self, block_hash: &[u8]) -> Result<Option<BoundWitness>> {
        let Some(data) = self
            .store
            .read(block_hash, self.config.read_timeout())
            .await?
        else {
            return Ok(None);
        };

        let value = self
            .packer
            .deserialize(&data)?
            .ok_or_else(|| ChainError::NotABlock(hex_prefix(block_hash)))?;
        let block = value
            .downcast::<BoundWitness>()
            .ok_or_else(|| ChainError::NotABlock(hex_prefix(block_hash)))?;
        Ok(Some(*block))
    }

    /// Packed hash of the block that follows `block_hash`, if one was linked.
    pub async fn get_next_block_hash(&self, block_hash: &[u8]) -> Result<Option<Bytes>> {
        let key = forward_link_key(block_hash);
        Ok(self.store.read(&key, self.config.read_timeout()).await?)
    }
}

fn hex_prefix(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(12)])
}
