//! Things with identity that outlive changes to their state (cart lines, order lines).

pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Two entities are the same thing when their ids match, whatever their state.
    fn same_identity(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.id() == other.id()
    }
}
