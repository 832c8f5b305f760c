//! Durable store contract and the in-memory reference backend.
//!
//! The store owns byte-level persistence only. Parsing and validating the
//! stored payload belong to the core ([`Switch::from_raw`]); the registry
//! treats whatever the store returns as opaque blobs.
//!
//! [`Switch::from_raw`]: crate::switch::Switch::from_raw

use crate::error::SwitchResult;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;

/// Durable store backing a switch registry.
#[async_trait]
pub trait SwitchStore: Send + Sync {
    /// Load every stored switch as (key, raw payload) in one pass.
    async fn load_all(&self) -> SwitchResult<HashMap<String, String>>;

    /// Persist one raw payload under `key`, replacing any previous value.
    async fn write(&self, key: &str, raw: String) -> SwitchResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> SwitchResult<()>;
}

/// In-memory store, suitable for tests and single-instance deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored switches (for monitoring).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SwitchStore for MemoryStore {
    async fn load_all(&self) -> SwitchResult<HashMap<String, String>> {
        Ok(self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn write(&self, key: &str, raw: String) -> SwitchResult<()> {
        self.entries.insert(key.to_string(), raw);
        Ok(())
    }

    async fn delete(&self, key: &str) -> SwitchResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
