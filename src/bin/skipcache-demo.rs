//! skipcache Demo Binary
//!
//! Walks a list through insert, dump, delete, expiry and lookup, printing
//! the structure along the way.

use clap::Parser;
use skipcache::{Config, ExpirySweeper, SkipList};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// skipcache demo - ordered index with LRU cache and TTL expiry
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Maximum skip list level
    #[arg(long, default_value_t = 6)]
    max_level: usize,

    /// Entry time-to-live in seconds
    #[arg(long, default_value_t = 2)]
    ttl_secs: u64,

    /// Recency cache capacity
    #[arg(long, default_value_t = 100)]
    cache_capacity: usize,

    /// Dump file path
    #[arg(long, default_value = "./store/dumpFile")]
    store_path: PathBuf,

    /// Pause before the expiry phase, in seconds
    #[arg(long, default_value_t = 3)]
    pause_secs: u64,

    /// Background sweep interval in seconds (0 = no sweeper)
    #[arg(long, default_value_t = 0)]
    sweep_interval: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("skipcache=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = Config::default()
        .with_max_level(args.max_level)
        .with_ttl(Duration::from_secs(args.ttl_secs))
        .with_cache_capacity(args.cache_capacity)
        .with_store_path(&args.store_path);
    if args.sweep_interval > 0 {
        config = config.with_sweep_interval(Duration::from_secs(args.sweep_interval));
    }

    let list: Arc<SkipList<i32, String>> = Arc::new(SkipList::new(config)?);
    let sweeper = (args.sweep_interval > 0).then(|| ExpirySweeper::spawn(Arc::clone(&list)));

    for (key, value) in [
        (1, "aaa"),
        (3, "bbb"),
        (3, "ccc"),
        (3, "ddd"),
        (5, "eee"),
        (6, "fff"),
        (7, "ggg"),
    ] {
        let outcome = list.insert(key, value.to_string());
        info!(key, value, ?outcome, "insert");
    }
    println!("skipList size: {}", list.len());

    list.dump_file()?;

    for key in [3, 2] {
        report(&list, key);
    }
    print!("{}", list.render());

    list.delete(&5);
    list.delete(&7);
    println!("skipList size: {}", list.len());
    print!("{}", list.render());

    info!("Sleeping {}s to let entries expire", args.pause_secs);
    tokio::time::sleep(Duration::from_secs(args.pause_secs)).await;

    list.insert(6, "hhh".to_string());
    list.insert(9, "hhh".to_string());
    for key in [3, 9] {
        report(&list, key);
    }
    println!("skipList size: {}", list.len());
    print!("{}", list.render());

    info!("{}", list.metrics().summary());

    if let Some(handle) = sweeper {
        handle.abort();
    }

    Ok(())
}

fn report(list: &SkipList<i32, String>, key: i32) {
    match list.search(&key) {
        Some(value) => println!("Found key: {}, value: {}", key, value),
        None => println!("Not Found Key: {}", key),
    }
}
