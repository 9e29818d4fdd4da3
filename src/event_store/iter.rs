//! Range-scan iterator
//!
//! `EventIter` is a cursor over one bucket. It copies events out in small
//! batches, holding the bucket's read lock only while a batch is copied, and
//! remembers the key of the last event it handed out. Each refill resumes
//! strictly after that key, so the iterator:
//!
//! - yields events in ascending `(timestamp, insertion)` order, never twice;
//! - yields every event that existed when the scan started and was not
//!   removed before the cursor reached it;
//! - may or may not yield events inserted or removed while it runs;
//! - never fails because the store is mutated underneath it.

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::ops::Bound;
use std::sync::Arc;

use crate::types::Event;

use super::bucket::{EventKey, TypeBucket};

/// Lazy iterator over the events of one type within `[start, end)`
#[derive(Debug)]
pub struct EventIter {
    bucket: Option<Arc<TypeBucket>>,
    end: i64,
    cursor: Bound<EventKey>,
    buffer: VecDeque<(EventKey, Event)>,
    batch_size: usize,
    exhausted: bool,
    last_yielded: Option<EventKey>,
}

impl EventIter {
    /// An iterator that yields nothing
    pub(crate) fn empty() -> Self {
        Self {
            bucket: None,
            end: 0,
            cursor: Bound::Unbounded,
            buffer: VecDeque::new(),
            batch_size: 1,
            exhausted: true,
            last_yielded: None,
        }
    }

    pub(crate) fn new(bucket: Arc<TypeBucket>, start: i64, end: i64, batch_size: usize) -> Self {
        Self {
            bucket: Some(bucket),
            end,
            cursor: Bound::Included((start, 0)),
            buffer: VecDeque::new(),
            batch_size: batch_size.max(1),
            exhausted: false,
            last_yielded: None,
        }
    }

    /// Remove the most recently yielded event from the store.
    ///
    /// Returns `false` if nothing has been yielded yet, or if the event was
    /// already removed (by a previous call or a concurrent `remove_all`).
    pub fn remove(&mut self) -> bool {
        match (&self.bucket, self.last_yielded.take()) {
            (Some(bucket), Some(key)) => bucket.remove_key(key),
            _ => false,
        }
    }

    fn refill(&mut self) {
        let Some(bucket) = &self.bucket else {
            self.exhausted = true;
            return;
        };

        let fetched = bucket.fill_range(self.cursor, self.end, self.batch_size, &mut self.buffer);
        if let Some((key, _)) = self.buffer.back() {
            self.cursor = Bound::Excluded(*key);
        }
        if fetched < self.batch_size {
            self.exhausted = true;
        }
    }
}

impl Iterator for EventIter {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.buffer.is_empty() && !self.exhausted {
            self.refill();
        }

        match self.buffer.pop_front() {
            Some((key, event)) => {
                self.last_yielded = Some(key);
                Some(event)
            }
            None => {
                self.last_yielded = None;
                None
            }
        }
    }
}

impl FusedIterator for EventIter {}
