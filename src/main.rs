//! LRU TTL Cache - demo binary
//!
//! Walks a shared cache through fills, lookups, evictions, updates,
//! deletes and TTL expiry, then prints a JSON stats report.

use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_ttl_cache::{spawn_sweeper, Config, SharedCache, StatsReport};

/// Startup sequence:
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared cache and optional sweeper
/// 4. Replay the walk-through
/// 5. Print the stats report and stop the sweeper
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load cache configuration")?;
    info!(
        "Configuration loaded: capacity={}, policy={}, default_ttl={:?}, sweep_interval={:?}",
        config.capacity, config.policy, config.default_ttl, config.sweep_interval
    );

    // The walk-through needs a small cache to show evictions.
    let demo_config = Config {
        capacity: config.capacity.min(3),
        ..config.clone()
    };
    let cache: SharedCache<String, i64> = SharedCache::from_config(&demo_config);
    let sweeper = config
        .sweep_interval
        .map(|interval| spawn_sweeper(cache.clone(), interval));

    walk_through(&cache).await;

    let report = StatsReport::from_stats(&cache.stats(), cache.policy());
    println!("{}", report.to_json().context("failed to render stats report")?);

    if let Some(sweeper) = sweeper {
        sweeper.stop().await;
    }
    info!("Demo complete");
    Ok(())
}

async fn walk_through(cache: &SharedCache<String, i64>) {
    for (key, value) in [("a", 1), ("b", 2), ("c", 3)] {
        cache.put(key.to_string(), value);
    }
    info!("After put(a, b, c): {}", cache);

    info!("get(a) = {:?}", cache.get("a"));
    info!("After get(a): {}", cache);

    cache.put("d".to_string(), 4);
    info!("After put(d): {}", cache);
    info!("get(b) = {:?}", cache.get("b"));

    cache.put("c".to_string(), 30);
    info!("After put(c, 30): {}", cache);

    info!("delete(d) = {}", cache.delete("d"));
    info!("contains(a) = {}, contains(b) = {}", cache.contains("a"), cache.contains("b"));

    cache.put_with_ttl("short".to_string(), 99, Duration::from_millis(5));
    tokio::time::sleep(Duration::from_millis(20)).await;
    info!("get(short) after its TTL = {:?}", cache.get("short"));
    info!("Final state: {}", cache);
}
