//! Domain foundation building blocks for bordertally.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{CrossingId, SubjectId};
pub use value_object::ValueObject;
