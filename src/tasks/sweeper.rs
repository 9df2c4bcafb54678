//! Expiration Sweeper Task
//!
//! Background task that periodically removes expired cache entries.
//! Without it, expired entries are only discovered when they are read.

use std::hash::Hash;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::SharedCache;

// == Sweeper Handle ==
/// Controls a running sweeper. Dropping the handle also signals it to stop.
#[derive(Debug)]
pub struct SweeperHandle {
    stop_tx: watch::Sender<bool>,
    join: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signals the sweeper and waits for it to exit.
    ///
    /// A sweep already holding the cache lock finishes first; no new sweep
    /// starts after the signal is seen.
    pub async fn stop(mut self) {
        self.stop_tx.send_replace(true);
        if let Some(join) = self.join.take() {
            if let Err(err) = join.await {
                warn!(error = %err, "expiration sweeper did not exit cleanly");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, |join| join.is_finished())
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}

/// Spawns a task that calls [`SharedCache::purge_expired`] every `interval`.
///
/// Sweeps take the same lock as every other cache operation, so a sweep
/// never races a concurrent `get` of the same key.
///
/// Must be called from within a tokio runtime.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::new(1000);
/// let sweeper = spawn_sweeper(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweeper.stop().await;
/// ```
pub fn spawn_sweeper<K, V>(cache: SharedCache<K, V>, interval: Duration) -> SweeperHandle
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let join = tokio::spawn(async move {
        info!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "starting expiration sweeper"
        );

        loop {
            // Stop wins over a sleep that finished at the same time.
            tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = cache.purge_expired();
            if removed > 0 {
                info!(removed, "expiration sweep removed entries");
            } else {
                debug!("expiration sweep found no expired entries");
            }
        }

        info!("expiration sweeper stopped");
    });

    SweeperHandle {
        stop_tx,
        join: Some(join),
    }
}
