//! # Key Registry
//!
//! Process-wide cache of loaded key material. Key loading is a one-time,
//! read-mostly operation — proving keys are large — so every consumer
//! shares one `Arc` per `(circuit, version)` instead of re-reading from
//! disk.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::circuits::CircuitType;
use crate::error::ZkpError;
use crate::setup::{CircuitKeys, KeyStore};

/// Shared cache of [`CircuitKeys`] keyed by `(circuit, version)`.
#[derive(Default)]
pub struct KeyRegistry {
    inner: RwLock<HashMap<(CircuitType, u32), Arc<CircuitKeys>>>,
}

impl KeyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache freshly generated keys.
    pub fn insert(&self, keys: CircuitKeys) -> Arc<CircuitKeys> {
        let key = (keys.metadata.circuit_type, keys.metadata.version);
        let shared = Arc::new(keys);
        self.inner.write().insert(key, shared.clone());
        shared
    }

    /// Cached keys, if present.
    pub fn get(&self, circuit_type: CircuitType, version: u32) -> Option<Arc<CircuitKeys>> {
        self.inner.read().get(&(circuit_type, version)).cloned()
    }

    /// Cached keys, loading (and caching) from the store on first use.
    pub fn load_or_insert(
        &self,
        store: &KeyStore,
        circuit_type: CircuitType,
        version: u32,
    ) -> Result<Arc<CircuitKeys>, ZkpError> {
        if let Some(keys) = self.get(circuit_type, version) {
            return Ok(keys);
        }
        let loaded = store.load(circuit_type, version)?;
        let mut inner = self.inner.write();
        // Another thread may have loaded concurrently; first one wins.
        let entry = inner
            .entry((circuit_type, version))
            .or_insert_with(|| Arc::new(loaded));
        Ok(entry.clone())
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
