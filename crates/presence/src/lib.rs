//! Residency day accounting.
//!
//! Pure domain logic only: no IO, no clock, no persistence concerns. Callers
//! hand in a snapshot of crossings plus the local reference date and get back
//! a day count (or the full [`DayAccount`] trace).

pub mod calendar;
pub mod crossing;
pub mod engine;
pub mod stats;

pub use calendar::{ReferenceZone, inclusive_days};
pub use crossing::{CrossingEvent, CrossingKind, NewCrossing};
pub use engine::{
    DayAccount, DayAccountant, IgnoreReason, IgnoredCrossing, OpenEntry, OpenEntrySkip,
    RepeatedEntryPolicy, Stay, StayEnd, compute_days_present,
};
pub use stats::{DEFAULT_TARGET_DAYS, ResidencyStats};
