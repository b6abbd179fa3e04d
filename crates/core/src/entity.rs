//! Entity trait: records that keep their identity while their attributes change.

/// Identity of a catalog record.
///
/// Two products with the same id are the same physical piece, even when one
/// copy is a stale snapshot with a different set membership.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Whether this record is the one identified by `id`.
    fn is(&self, id: &Self::Id) -> bool {
        self.id() == id
    }
}
