//! Infrastructure layer: crossing storage, clock, configuration, and the
//! service that feeds stored crossings to the day-accounting engine.

pub mod clock;
pub mod config;
pub mod crossing_store;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ResidencyConfig};
pub use crossing_store::{CrossingRecord, CrossingStore, CrossingStoreError, InMemoryCrossingStore};
pub use service::{ResidencyService, ServiceError};
