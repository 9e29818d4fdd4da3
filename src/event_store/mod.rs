//! Event Store Module
//!
//! This module provides the concurrent in-memory store:
//! - `EventStore`: routes operations to per-type buckets
//! - `TypeBucket`: timestamp-ordered events of one type
//! - `EventIter`: lazy range scan over a bucket
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌──────────┐    ┌─────────────────────┐    ┌────────────────────────┐
//! │ insert() │───►│ registry read lock  │───►│ bucket write lock      │
//! │          │    │ (write lock on miss)│    │ BTreeMap + size count  │
//! └──────────┘    └─────────────────────┘    └────────────────────────┘
//!
//! Read Path:
//! ┌──────────┐    ┌─────────────────────┐    ┌────────────────────────┐
//! │ query()  │───►│ registry read lock  │───►│ EventIter: copy batches│
//! │          │    │                     │    │ under bucket read lock │
//! └──────────┘    └─────────────────────┘    └────────────────────────┘
//! ```

mod bucket;
mod iter;
mod store;

pub use iter::EventIter;
pub use store::{EventStore, EventStoreConfig, EventStoreError, EventStoreResult, SCAN_BATCH_ENV};
