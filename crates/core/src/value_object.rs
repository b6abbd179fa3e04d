//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. A set name or a sub-item summary is a value object: two
//! of them with the same contents are interchangeable.

/// Marker trait for value objects.
///
/// The trait requires:
/// - **Clone**: value objects are copied freely between materialization passes
/// - **PartialEq**: value objects are compared by their attribute values
/// - **Debug**: value objects show up in logs and test failures
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct SetName(String);
///
/// impl ValueObject for SetName {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
