//! Switch registry: a TTL-cached snapshot of the switch set backed by a
//! durable store.
//!
//! Reads are served from an in-memory snapshot behind an atomically
//! swapped `Arc`. When the snapshot is older than the configured TTL, or
//! after [`mark_stale`](SwitchRegistry::mark_stale), the next access
//! reloads the full set from the store in one pass. Readers never wait on
//! a refresh in progress: they see either the old snapshot or the new
//! one, never a partial mix.

use crate::config::RegistryConfig;
use crate::error::{SwitchError, SwitchResult};
use crate::evaluator;
use crate::store::SwitchStore;
use crate::subject::Subject;
use crate::switch::{Switch, SwitchValue};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

/// One full view of the switch set.
#[derive(Debug)]
struct Snapshot {
    switches: HashMap<String, Switch>,
    fetched_at: Instant,
}

/// Process-facing mapping from key to [`Switch`].
///
/// Construct one per process with an explicit store handle and
/// [`RegistryConfig`]; there is no global instance. Evaluation calls are
/// cheap snapshot reads, so the registry can be shared behind an `Arc`
/// and hit from any number of tasks.
pub struct SwitchRegistry<S: SwitchStore> {
    store: Arc<S>,
    config: RegistryConfig,
    snapshot: RwLock<Arc<Snapshot>>,
    refresh: Mutex<()>,
    stale: AtomicBool,
    store_down: AtomicBool,
}

impl<S: SwitchStore> SwitchRegistry<S> {
    /// Create a registry over `store`. The first access loads the set.
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
            snapshot: RwLock::new(Arc::new(Snapshot {
                switches: HashMap::new(),
                fetched_at: Instant::now(),
            })),
            refresh: Mutex::new(()),
            stale: AtomicBool::new(true),
            store_down: AtomicBool::new(false),
        }
    }

    /// Evaluate a switch for zero or more subjects.
    ///
    /// Never errors: an unknown key and a malformed stored value are both
    /// inactive.
    pub async fn is_active(&self, key: &str, subjects: &[&dyn Subject]) -> bool {
        self.refresh_if_stale().await;
        match self.current().switches.get(key) {
            Some(switch) => evaluator::evaluate(switch, subjects),
            None => false,
        }
    }

    /// Like [`is_active`](Self::is_active), except an unknown key is
    /// [`SwitchError::UnknownSwitch`] instead of inactive.
    pub async fn is_active_strict(
        &self,
        key: &str,
        subjects: &[&dyn Subject],
    ) -> SwitchResult<bool> {
        self.refresh_if_stale().await;
        match self.current().switches.get(key) {
            Some(switch) => Ok(evaluator::evaluate(switch, subjects)),
            None => Err(SwitchError::UnknownSwitch(key.to_string())),
        }
    }

    /// Current switch for `key`, if one exists.
    pub async fn get(&self, key: &str) -> Option<Switch> {
        self.refresh_if_stale().await;
        self.current().switches.get(key).cloned()
    }

    /// Write a switch through to the store and into the local snapshot,
    /// so the writer observes its own write without waiting for the TTL.
    pub async fn set(&self, key: &str, value: SwitchValue) -> SwitchResult<()> {
        let raw = value.to_raw()?;
        self.store.write(key, raw).await?;
        let switch = Switch::new(key, value);
        self.update_snapshot(|switches| {
            switches.insert(key.to_string(), switch);
        });
        debug!(key = %key, "switch written");
        Ok(())
    }

    /// Remove a switch from the store and the local snapshot.
    pub async fn delete(&self, key: &str) -> SwitchResult<()> {
        self.store.delete(key).await?;
        self.update_snapshot(|switches| {
            switches.remove(key);
        });
        debug!(key = %key, "switch deleted");
        Ok(())
    }

    /// Mark the snapshot stale so the next access reloads regardless of
    /// TTL. Idempotent. Wire this to whatever unit-of-work boundary the
    /// integration layer has; the hook imposes no cadence of its own.
    pub fn mark_stale(&self) {
        self.stale.store(true, Ordering::Release);
    }

    /// Reload the snapshot from the store if it has gone stale.
    ///
    /// Returns `true` if a reload happened. Concurrent callers collapse
    /// into a single fetch; the losers keep reading the old snapshot. On
    /// fetch failure or timeout the stale snapshot stays in service and
    /// the outage is logged once per transition.
    pub async fn refresh_if_stale(&self) -> bool {
        if !self.is_stale() {
            return false;
        }
        // single-flight: whoever holds the guard fetches, everyone else
        // backs off to the old snapshot
        let Ok(_guard) = self.refresh.try_lock() else {
            return false;
        };
        if !self.is_stale() {
            return false;
        }

        // the fetch runs outside the snapshot lock so slow I/O never
        // blocks readers of the still-valid snapshot
        let loaded = match timeout(self.config.fetch_timeout, self.store.load_all()).await {
            Ok(Ok(loaded)) => loaded,
            Ok(Err(err)) => {
                self.note_store_failure(&err.to_string());
                return false;
            }
            Err(_) => {
                self.note_store_failure(&SwitchError::Timeout.to_string());
                return false;
            }
        };
        if self.store_down.swap(false, Ordering::AcqRel) {
            debug!("switch store recovered");
        }

        let switches = loaded
            .into_iter()
            .map(|(key, raw)| {
                let switch = Switch::from_raw(key.as_str(), &raw);
                (key, switch)
            })
            .collect();
        *self.snapshot.write() = Arc::new(Snapshot {
            switches,
            fetched_at: Instant::now(),
        });
        self.stale.store(false, Ordering::Release);
        debug!("switch snapshot refreshed");
        true
    }

    /// Handle to the underlying store, for authoring paths that write
    /// behind the registry.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
            || self.current().fetched_at.elapsed() >= self.config.ttl
    }

    fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read())
    }

    fn update_snapshot(&self, mutate: impl FnOnce(&mut HashMap<String, Switch>)) {
        let mut guard = self.snapshot.write();
        let mut switches = guard.switches.clone();
        mutate(&mut switches);
        *guard = Arc::new(Snapshot {
            switches,
            fetched_at: guard.fetched_at,
        });
    }

    fn note_store_failure(&self, reason: &str) {
        // one warning per outage transition, not one per call
        if !self.store_down.swap(true, Ordering::AcqRel) {
            warn!(reason = %reason, "switch store unavailable, serving stale snapshot");
        }
    }
}
