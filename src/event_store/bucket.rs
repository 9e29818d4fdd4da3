//! Type Bucket - ordered storage for the events of one type
//!
//! Events are kept in a `BTreeMap` keyed by `(timestamp, seq)`. The sequence
//! number is assigned under the write lock, so events sharing a timestamp
//! stay in insertion order and every key is unique.

use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::Event;

use super::iter::EventIter;

/// Position of an event inside its bucket
pub(crate) type EventKey = (i64, u64);

#[derive(Debug, Default)]
struct BucketInner {
    events: BTreeMap<EventKey, Event>,
    next_seq: u64,
}

/// All events of a single type, ordered by timestamp
#[derive(Debug)]
pub(crate) struct TypeBucket {
    event_type: String,
    inner: RwLock<BucketInner>,
    /// Store-wide event count, updated inside this bucket's write lock
    total: Arc<AtomicUsize>,
}

impl TypeBucket {
    pub(crate) fn new(event_type: String, total: Arc<AtomicUsize>) -> Self {
        Self {
            event_type,
            inner: RwLock::new(BucketInner::default()),
            total,
        }
    }

    pub(crate) fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Insert one event after any existing events with the same timestamp
    pub(crate) fn insert(&self, event: Event) {
        let mut inner = self.inner.write();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.events.insert((event.timestamp(), seq), event);
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    /// Insert several events under a single lock acquisition, keeping their order
    pub(crate) fn insert_many(&self, events: Vec<Event>) -> usize {
        let count = events.len();
        let mut inner = self.inner.write();
        for event in events {
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.events.insert((event.timestamp(), seq), event);
        }
        self.total.fetch_add(count, Ordering::SeqCst);
        count
    }

    /// Remove every event currently in the bucket, returning how many were removed
    pub(crate) fn clear(&self) -> usize {
        let drained = {
            let mut inner = self.inner.write();
            let drained = std::mem::take(&mut inner.events);
            self.total.fetch_sub(drained.len(), Ordering::SeqCst);
            drained
        };
        // Dropped outside the lock
        drained.len()
    }

    /// Remove a single event by key
    pub(crate) fn remove_key(&self, key: EventKey) -> bool {
        let mut inner = self.inner.write();
        if inner.events.remove(&key).is_some() {
            self.total.fetch_sub(1, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().events.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.read().events.is_empty()
    }

    /// Copy of all events in scan order
    pub(crate) fn events(&self) -> Vec<Event> {
        self.inner.read().events.values().cloned().collect()
    }

    /// Lazy ascending scan over `[start, end)`
    pub(crate) fn range_scan(
        self: &Arc<Self>,
        start: i64,
        end: i64,
        batch_size: usize,
    ) -> EventIter {
        if start >= end {
            return EventIter::empty();
        }
        EventIter::new(Arc::clone(self), start, end, batch_size)
    }

    /// Copy up to `limit` events with keys after `lower` and timestamps below `end`.
    ///
    /// Returns the number of events appended to `out`.
    pub(crate) fn fill_range(
        &self,
        lower: Bound<EventKey>,
        end: i64,
        limit: usize,
        out: &mut VecDeque<(EventKey, Event)>,
    ) -> usize {
        let upper = (end, 0);
        let below_upper = match lower {
            Bound::Included(key) => key < upper,
            Bound::Excluded(key) => key < upper,
            Bound::Unbounded => true,
        };
        if !below_upper {
            return 0;
        }

        let inner = self.inner.read();
        let before = out.len();
        out.extend(
            inner
                .events
                .range((lower, Bound::Excluded(upper)))
                .take(limit)
                .map(|(key, event)| (*key, event.clone())),
        );
        out.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn new_bucket() -> (Arc<TypeBucket>, Arc<AtomicUsize>) {
        let total = Arc::new(AtomicUsize::new(0));
        let bucket = Arc::new(TypeBucket::new("type_a".to_string(), Arc::clone(&total)));
        (bucket, total)
    }

    fn timestamps(bucket: &TypeBucket) -> Vec<i64> {
        bucket.events().iter().map(Event::timestamp).collect()
    }

    #[test]
    fn test_insert_keeps_timestamp_order() {
        let (bucket, total) = new_bucket();
        for ts in [15, 0, 10, 5, -3] {
            bucket.insert(Event::new("type_a", ts));
        }

        assert_eq!(timestamps(&bucket), vec![-3, 0, 5, 10, 15]);
        assert_eq!(bucket.len(), 5);
        assert_eq!(total.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let (bucket, _) = new_bucket();
        let first = Event::new("type_a", 10);
        let second = Event::new("type_a", 10);
        bucket.insert(Event::new("type_a", 12));
        bucket.insert(first);
        bucket.insert(Event::new("type_a", 8));
        bucket.insert(second);

        let keys: Vec<EventKey> = bucket.inner.read().events.keys().copied().collect();
        assert_eq!(keys, vec![(8, 2), (10, 1), (10, 3), (12, 0)]);
    }

    #[test]
    fn test_clear_returns_removed_count() {
        let (bucket, total) = new_bucket();
        bucket.insert_many((0..7).map(|ts| Event::new("type_a", ts)).collect());
        assert_eq!(total.load(Ordering::SeqCst), 7);

        assert_eq!(bucket.clear(), 7);
        assert!(bucket.is_empty());
        assert_eq!(total.load(Ordering::SeqCst), 0);

        assert_eq!(bucket.clear(), 0);
    }

    #[test]
    fn test_sequence_survives_clear() {
        let (bucket, _) = new_bucket();
        bucket.insert(Event::new("type_a", 1));
        bucket.clear();
        bucket.insert(Event::new("type_a", 1));

        let keys: Vec<EventKey> = bucket.inner.read().events.keys().copied().collect();
        assert_eq!(keys, vec![(1, 1)]);
    }

    #[test]
    fn test_remove_key() {
        let (bucket, total) = new_bucket();
        bucket.insert(Event::new("type_a", 4));
        bucket.insert(Event::new("type_a", 4));

        assert!(bucket.remove_key((4, 0)));
        assert!(!bucket.remove_key((4, 0)));
        assert_eq!(bucket.len(), 1);
        assert_eq!(total.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fill_range_respects_bounds_and_limit() {
        let (bucket, _) = new_bucket();
        for ts in 0..20 {
            bucket.insert(Event::new("type_a", ts));
        }

        let mut out = VecDeque::new();
        let n = bucket.fill_range(Bound::Included((5, 0)), 15, 4, &mut out);
        assert_eq!(n, 4);
        let got: Vec<i64> = out.iter().map(|(_, e)| e.timestamp()).collect();
        assert_eq!(got, vec![5, 6, 7, 8]);

        let last = out.back().map(|(k, _)| *k).unwrap();
        out.clear();
        let n = bucket.fill_range(Bound::Excluded(last), 15, 100, &mut out);
        assert_eq!(n, 6);
        assert_eq!(out.back().map(|(_, e)| e.timestamp()), Some(14));
    }

    #[test]
    fn test_fill_range_past_end_is_empty() {
        let (bucket, _) = new_bucket();
        bucket.insert(Event::new("type_a", 3));

        let mut out = VecDeque::new();
        assert_eq!(bucket.fill_range(Bound::Excluded((9, 0)), 9, 10, &mut out), 0);
        assert_eq!(bucket.fill_range(Bound::Included((9, 0)), 9, 10, &mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_range_scan_inverted_interval_is_empty() {
        let (bucket, _) = new_bucket();
        bucket.insert(Event::new("type_a", 3));

        assert_eq!(bucket.range_scan(5, 1, 8).count(), 0);
        assert_eq!(bucket.range_scan(3, 3, 8).count(), 0);
        assert_eq!(bucket.range_scan(3, 4, 8).count(), 1);
    }

    #[test]
    fn test_concurrent_inserts_are_not_lost() {
        let (bucket, total) = new_bucket();
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let bucket = Arc::clone(&bucket);
                thread::spawn(move || {
                    for i in 0..250 {
                        bucket.insert(Event::new("type_a", (i % 17) * worker));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(bucket.len(), 2000);
        assert_eq!(total.load(Ordering::SeqCst), 2000);
        let ts = timestamps(&bucket);
        assert!(ts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_insert_racing_clear_is_fully_before_or_after() {
        let (bucket, total) = new_bucket();
        let writer = {
            let bucket = Arc::clone(&bucket);
            thread::spawn(move || {
                for i in 0..5000 {
                    bucket.insert(Event::new("type_a", i));
                }
            })
        };

        let mut removed = 0;
        for _ in 0..50 {
            removed += bucket.clear();
            thread::yield_now();
        }
        writer.join().unwrap();

        // Every insert was either cleared or survived
        assert_eq!(removed + bucket.len(), 5000);
        assert_eq!(total.load(Ordering::SeqCst), bucket.len());
    }
}
