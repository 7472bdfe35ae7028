//! Crossing log boundary.
//!
//! Infrastructure-facing abstraction for storing and loading per-subject
//! crossing logs without making any storage assumptions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryCrossingStore;
pub use r#trait::{CrossingRecord, CrossingStore, CrossingStoreError};
