//! Shared pool/usage snapshot.
//!
//! The poller publishes complete, immutable snapshots through a watch
//! channel. Readers clone the current `Arc` and drop the borrow right away,
//! so no lock is held while views are built or rendered.

use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;

use super::pool::{PoolState, UsageMap};
use crate::error::Result;

/// Complete monitoring state at one point in time
#[derive(Debug, Clone, Default)]
pub struct MonitorSnapshot {
    pub pools: Arc<Vec<PoolState>>,
    pub usage: Arc<UsageMap>,
    /// Bumped on every publish.
    pub generation: u64,
}

impl MonitorSnapshot {
    pub fn pool(&self, name: &str) -> Option<&PoolState> {
        self.pools.iter().find(|p| p.name == name)
    }
}

/// Serialized form of a snapshot, e.g. a poller dump loaded at startup.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotDocument {
    pub pools: Vec<PoolState>,
    pub usage: UsageMap,
}

/// Handle to the shared snapshot. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<Arc<MonitorSnapshot>>>,
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(MonitorSnapshot::default()));
        Self { tx: Arc::new(tx) }
    }

    /// Replace the pool list, keeping the current usage.
    pub fn publish_pools(&self, pools: Vec<PoolState>) {
        let pools = Arc::new(pools);
        self.publish_with(|current| MonitorSnapshot {
            pools,
            usage: Arc::clone(&current.usage),
            generation: current.generation + 1,
        });
    }

    /// Replace the usage map, keeping the current pools.
    pub fn publish_usage(&self, usage: UsageMap) {
        let usage = Arc::new(usage);
        self.publish_with(|current| MonitorSnapshot {
            pools: Arc::clone(&current.pools),
            usage,
            generation: current.generation + 1,
        });
    }

    /// Replace pools and usage together.
    pub fn publish(&self, pools: Vec<PoolState>, usage: UsageMap) {
        let (pools, usage) = (Arc::new(pools), Arc::new(usage));
        self.publish_with(|current| MonitorSnapshot {
            pools,
            usage,
            generation: current.generation + 1,
        });
    }

    fn publish_with<F>(&self, build: F)
    where
        F: FnOnce(&MonitorSnapshot) -> MonitorSnapshot,
    {
        // send_modify holds the channel's write lock, so concurrent
        // half-updates cannot lose each other's data
        self.tx.send_modify(|current| {
            let next = build(current.as_ref());
            *current = Arc::new(next);
        });
    }

    /// Publish pools and usage from a JSON [`SnapshotDocument`].
    pub fn publish_json(&self, json: &str) -> Result<()> {
        let doc: SnapshotDocument = serde_json::from_str(json)?;
        log::info!("Publishing {} pools from snapshot document", doc.pools.len());
        self.publish(doc.pools, doc.usage);
        Ok(())
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<MonitorSnapshot> {
        Arc::clone(&self.tx.borrow())
    }

    /// Receiver that is notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<MonitorSnapshot>> {
        self.tx.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
