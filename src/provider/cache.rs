//! Token metadata cache
//!
//! Owned by a [`PublicProvider`](super::PublicProvider) instance; there is no
//! process-wide cache.

use alloy::primitives::Address;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Symbol and decimals of an ERC-20 token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub symbol: String,
    pub decimals: u8,
}

/// A thread-safe TTL cache keyed by `(network_id, token)`
#[derive(Clone)]
pub struct TokenCache {
    ttl: Duration,
    inner: Arc<DashMap<(u64, Address), (Instant, TokenMetadata)>>,
}

impl TokenCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Cached metadata, if present and not expired
    pub fn get(&self, network_id: u64, token: Address) -> Option<TokenMetadata> {
        let key = (network_id, token);
        {
            let entry = self.inner.get(&key)?;
            let (stored_at, metadata) = entry.value();
            if stored_at.elapsed() < self.ttl {
                return Some(metadata.clone());
            }
        }
        // expired; the read guard is released above
        self.inner.remove(&key);
        None
    }

    pub fn insert(&self, network_id: u64, token: Address, metadata: TokenMetadata) {
        self.inner
            .insert((network_id, token), (Instant::now(), metadata));
    }

    /// Drop one entry
    pub fn invalidate(&self, network_id: u64, token: Address) {
        self.inner.remove(&(network_id, token));
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
