//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// crossing as the engine sees it (kind, instant, port) is a value object;
/// the stored record wrapping it carries its own id.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
