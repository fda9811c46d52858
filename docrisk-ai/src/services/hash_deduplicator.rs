//! Content-hash deduplication
//!
//! SHA-256 over the raw document text decides whether a document has already
//! been analysed, independent of its filename. A hash is also claimed in
//! memory while its analysis runs, so two identical files arriving together
//! are analysed once.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::db::DocumentStore;

/// Hex-encoded SHA-256 of the document text
pub fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Deduplication result
#[derive(Debug)]
pub enum HashResult {
    /// Unseen content - continue processing while holding the claim
    Unique(HashClaim),
    /// Already analysed, or being analysed right now - skip
    Duplicate { hash: String },
}

/// In-memory reservation of a hash; released on drop
#[derive(Debug)]
pub struct HashClaim {
    hash: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl HashClaim {
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl Drop for HashClaim {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.remove(&self.hash);
    }
}

/// Hash deduplicator backed by the document store
pub struct HashDeduplicator {
    store: DocumentStore,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl HashDeduplicator {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Check a hash against in-flight work and the store
    pub async fn check(&self, hash: &str) -> HashResult {
        let Some(claim) = self.try_claim(hash) else {
            tracing::info!(hash = %hash, "Identical document already being analysed");
            return HashResult::Duplicate {
                hash: hash.to_string(),
            };
        };

        if self.store.exists(hash).await {
            tracing::debug!(hash = %hash, "Hash found in store");
            return HashResult::Duplicate {
                hash: hash.to_string(),
            };
        }

        HashResult::Unique(claim)
    }

    fn try_claim(&self, hash: &str) -> Option<HashClaim> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(hash.to_string()) {
            return None;
        }
        Some(HashClaim {
            hash: hash.to_string(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }
}
