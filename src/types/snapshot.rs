//! Diagnostic snapshot of store contents

use serde::{Deserialize, Serialize};

use super::Event;

/// Events of a single type, in bucket order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TypeSnapshot {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Best-effort copy of every non-empty type in the store.
///
/// Each type is copied atomically, but different types may be copied at
/// different instants while the store keeps mutating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub types: Vec<TypeSnapshot>,
}

impl StoreSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the snapshot holds no events
    pub fn is_empty(&self) -> bool {
        self.types.iter().all(|t| t.events.is_empty())
    }

    /// Total number of events across all types
    pub fn event_count(&self) -> usize {
        self.types.iter().map(|t| t.events.len()).sum()
    }

    /// Events for one type, if present
    pub fn events_of(&self, event_type: &str) -> Option<&[Event]> {
        self.types
            .iter()
            .find(|t| t.event_type == event_type)
            .map(|t| t.events.as_slice())
    }

    /// Serialize to a single JSON line
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

const SEPARATOR: &str = "----------------------------------------";

impl std::fmt::Display for StoreSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", SEPARATOR)?;
        for type_snapshot in &self.types {
            writeln!(f, ">>> {}", type_snapshot.event_type)?;
            for event in &type_snapshot.events {
                writeln!(f, "Ev {}", event.timestamp())?;
            }
            writeln!(f, "{}", SEPARATOR)?;
        }
        Ok(())
    }
}
