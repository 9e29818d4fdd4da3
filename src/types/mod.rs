//! Data types for the event store
//!
//! This module contains the value types handed across the store boundary.

mod event;
mod snapshot;

pub use event::Event;
pub use snapshot::{StoreSnapshot, TypeSnapshot};
