//! Typed Event Store - Demo Binary
//!
//! Fills a store from several threads, runs a few range queries and prints
//! the store contents. Set `RUST_LOG=typed_event_store=debug` to see the
//! store's own logging.

use std::sync::Arc;
use std::thread;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use typed_event_store::{Event, EventStore, EventStoreConfig};

const TYPES: [&str; 3] = ["type_a", "type_b", "type_c"];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("typed_event_store=info".parse()?),
        )
        .init();

    let config = EventStoreConfig::from_env();
    info!(
        scan_batch_size = config.scan_batch_size,
        "starting {} {}",
        typed_event_store::NAME,
        typed_event_store::VERSION
    );
    let store = Arc::new(EventStore::with_config(config));

    let workers: Vec<_> = TYPES
        .iter()
        .map(|&event_type| {
            let store = Arc::clone(&store);
            thread::spawn(move || -> Result<()> {
                for ts in (0..20).step_by(3) {
                    store.insert(Event::new(event_type, ts))?;
                }
                Ok(())
            })
        })
        .collect();
    for worker in workers {
        worker
            .join()
            .map_err(|_| anyhow::anyhow!("insert worker panicked"))??;
    }
    info!(size = store.size(), "store filled");

    for (start, end) in [(0, 10), (9, 15), (10, 10), (100, 150)] {
        let hits: Vec<String> = store
            .query("type_a", start, end)
            .map(|event| event.to_string())
            .collect();
        info!(start, end, count = hits.len(), "query type_a: {:?}", hits);
    }

    let removed = store.remove_all("type_b");
    info!(removed, size = store.size(), "removed type_b");

    print!("{}", store.snapshot());
    Ok(())
}
