//! Event Store - type registry and routing
//!
//! The EventStore maps each event type to its own bucket. The registry lock
//! is only held to look up or create a bucket; all per-type work happens
//! under that bucket's own lock, so unrelated types never contend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::types::{Event, StoreSnapshot, TypeSnapshot};

use super::bucket::TypeBucket;
use super::iter::EventIter;

/// Environment variable overriding the scan batch size
pub const SCAN_BATCH_ENV: &str = "EVENT_STORE_SCAN_BATCH";

/// Configuration for the EventStore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStoreConfig {
    /// Maximum number of events a range scan copies per lock acquisition
    pub scan_batch_size: usize,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            scan_batch_size: 64,
        }
    }
}

impl EventStoreConfig {
    /// Create config with a custom scan batch size
    pub fn with_scan_batch_size(scan_batch_size: usize) -> Self {
        Self {
            scan_batch_size: scan_batch_size.max(1),
        }
    }

    /// Read config from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(SCAN_BATCH_ENV).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim).map(str::parse::<usize>) {
            Some(Ok(size)) if size > 0 => Self::with_scan_batch_size(size),
            Some(_) => {
                warn!(
                    variable = SCAN_BATCH_ENV,
                    value = value.unwrap_or_default(),
                    "ignoring invalid scan batch size"
                );
                Self::default()
            }
            None => Self::default(),
        }
    }
}

/// Result type for EventStore operations
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Errors that can occur in EventStore operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventStoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Thread-safe in-memory store of typed, timestamped events
#[derive(Debug)]
pub struct EventStore {
    config: EventStoreConfig,
    buckets: RwLock<HashMap<String, Arc<TypeBucket>>>,
    /// Sum of all bucket sizes, maintained inside each bucket's critical section
    total: Arc<AtomicUsize>,
}

impl EventStore {
    /// Create a new EventStore with default config
    pub fn new() -> Self {
        Self::with_config(EventStoreConfig::default())
    }

    /// Create a new EventStore with custom config
    pub fn with_config(config: EventStoreConfig) -> Self {
        Self {
            config,
            buckets: RwLock::new(HashMap::new()),
            total: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &EventStoreConfig {
        &self.config
    }

    fn bucket(&self, event_type: &str) -> Option<Arc<TypeBucket>> {
        self.buckets.read().get(event_type).cloned()
    }

    fn bucket_or_create(&self, event_type: &str) -> Arc<TypeBucket> {
        if let Some(bucket) = self.bucket(event_type) {
            return bucket;
        }

        let mut buckets = self.buckets.write();
        let bucket = buckets.entry(event_type.to_string()).or_insert_with(|| {
            debug!(event_type, "creating bucket");
            Arc::new(TypeBucket::new(
                event_type.to_string(),
                Arc::clone(&self.total),
            ))
        });
        Arc::clone(bucket)
    }

    /// Store an event.
    ///
    /// Fails with `InvalidArgument` if the event type is empty.
    pub fn insert(&self, event: Event) -> EventStoreResult<()> {
        if let Err(e) = event.validate() {
            warn!(timestamp = event.timestamp(), "rejected event: {}", e);
            return Err(e);
        }

        trace!(event_type = event.event_type(), timestamp = event.timestamp(), "insert");
        self.bucket_or_create(event.event_type()).insert(event);
        Ok(())
    }

    /// Store many events, inserting different types in parallel.
    ///
    /// The batch is validated up front: if any event has an empty type,
    /// nothing is inserted. Events of the same type keep their relative order.
    pub fn insert_batch(&self, events: Vec<Event>) -> EventStoreResult<usize> {
        for event in &events {
            event.validate()?;
        }

        let mut groups: HashMap<String, Vec<Event>> = HashMap::new();
        for event in events {
            groups
                .entry(event.event_type().to_string())
                .or_default()
                .push(event);
        }

        let inserted: usize = groups
            .into_par_iter()
            .map(|(event_type, events)| self.bucket_or_create(&event_type).insert_many(events))
            .sum();

        debug!(inserted, "batch insert");
        Ok(inserted)
    }

    /// Remove all events of a type, returning how many were removed.
    ///
    /// Unknown types are a no-op.
    pub fn remove_all(&self, event_type: &str) -> usize {
        let Some(bucket) = self.bucket(event_type) else {
            return 0;
        };

        let removed = bucket.clear();
        debug!(event_type, removed, "removed all events of type");
        removed
    }

    /// Events of `event_type` with `start <= timestamp < end`, ascending.
    ///
    /// Unknown types and empty or inverted intervals yield an empty iterator.
    pub fn query(&self, event_type: &str, start: i64, end: i64) -> EventIter {
        trace!(event_type, start, end, "query");
        if start >= end {
            return EventIter::empty();
        }

        match self.bucket(event_type) {
            Some(bucket) => bucket.range_scan(start, end, self.config.scan_batch_size),
            None => EventIter::empty(),
        }
    }

    /// Total number of events in the store
    pub fn size(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Number of events of one type (0 for unknown types)
    pub fn size_of(&self, event_type: &str) -> usize {
        self.bucket(event_type).map_or(0, |bucket| bucket.len())
    }

    /// Check if the store holds no events
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Sorted list of types that currently hold events
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .buckets
            .read()
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(event_type, _)| event_type.clone())
            .collect();
        types.sort();
        types
    }

    /// Best-effort copy of every non-empty type and its events.
    ///
    /// Never mutates the store. Each type is copied under its own lock, so
    /// the result may mix states from slightly different instants.
    pub fn snapshot(&self) -> StoreSnapshot {
        let buckets: Vec<Arc<TypeBucket>> = self.buckets.read().values().cloned().collect();

        let mut types: Vec<TypeSnapshot> = buckets
            .par_iter()
            .map(|bucket| TypeSnapshot {
                event_type: bucket.event_type().to_string(),
                events: bucket.events(),
            })
            .filter(|snapshot| !snapshot.events.is_empty())
            .collect();
        types.sort_by(|a, b| a.event_type.cmp(&b.event_type));

        StoreSnapshot { types }
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}
