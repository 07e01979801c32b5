//! Expiry Sweeper
//!
//! Background task that periodically removes expired entries from a SkipList.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info};

use super::SkipList;

/// Background TTL sweep task
pub struct ExpirySweeper<K, V> {
    list: Arc<SkipList<K, V>>,
    interval: Duration,
}

impl<K, V> ExpirySweeper<K, V>
where
    K: Ord + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Debug + Send + Sync + 'static,
{
    /// Create a new sweeper
    pub fn new(list: Arc<SkipList<K, V>>, interval: Duration) -> Self {
        Self { list, interval }
    }

    /// Run the sweeper (should be spawned as a task)
    pub async fn run(self) {
        let mut ticker = interval(self.interval);
        info!("Expiry sweeper started, interval: {:?}", self.interval);

        loop {
            ticker.tick().await;
            let removed = self.list.sweep_expired();
            if removed > 0 {
                debug!(removed = removed, remaining = self.list.len(), "Swept expired keys");
            }
        }
    }

    /// Spawn a sweeper on the list's configured interval
    pub fn spawn(list: Arc<SkipList<K, V>>) -> tokio::task::JoinHandle<()> {
        let interval = list.config().sweep_interval;
        tokio::spawn(Self::new(list, interval).run())
    }
}
