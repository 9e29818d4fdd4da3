//! Typed Event Store
//!
//! A process-local, thread-safe store of timestamped, typed events with
//! range queries over `[start, end)` per type.
//!
//! # Features
//!
//! - **Per-type buckets**: each type has its own lock, so unrelated types never contend
//! - **Ordered storage**: range scans cost a logarithmic seek plus the matches
//! - **Stable ties**: events with equal timestamps come back in insertion order
//! - **Safe iteration**: query iterators keep working while the store mutates
//!
//! # Modules
//!
//! - `types`: Value types (Event, StoreSnapshot)
//! - `event_store`: The store, its buckets and range-scan iterator
//!
//! # Example
//!
//! ```
//! use typed_event_store::{Event, EventStore};
//!
//! let store = EventStore::new();
//! store.insert(Event::new("deploy", 10)).unwrap();
//! store.insert(Event::new("deploy", 25)).unwrap();
//!
//! let hits: Vec<i64> = store.query("deploy", 0, 20).map(|e| e.timestamp()).collect();
//! assert_eq!(hits, vec![10]);
//! ```

pub mod event_store;
pub mod types;

// Re-export commonly used items at crate root
pub use event_store::{EventIter, EventStore, EventStoreConfig, EventStoreError, EventStoreResult};
pub use types::{Event, StoreSnapshot, TypeSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
