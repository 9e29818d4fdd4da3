//! Event value type
//!
//! An event is an immutable `(type, timestamp)` record. Two events with the
//! same type and timestamp are still distinct events; the store keeps both.

use serde::{Deserialize, Serialize};

use crate::event_store::{EventStoreError, EventStoreResult};

/// A timestamped, typed event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    event_type: String,
    timestamp: i64,
}

impl Event {
    /// Create a new event without validating the type.
    ///
    /// The store rejects empty types on insert, so this is safe to use for
    /// building events ahead of time.
    pub fn new(event_type: impl Into<String>, timestamp: i64) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp,
        }
    }

    /// Create a new event, failing if the type is empty
    pub fn try_new(event_type: impl Into<String>, timestamp: i64) -> EventStoreResult<Self> {
        let event = Self::new(event_type, timestamp);
        event.validate()?;
        Ok(event)
    }

    /// The event type
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The event timestamp (caller-defined unit)
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub(crate) fn validate(&self) -> EventStoreResult<()> {
        if self.event_type.is_empty() {
            return Err(EventStoreError::InvalidArgument(
                "event type must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] Ev {}", self.event_type, self.timestamp)
    }
}
