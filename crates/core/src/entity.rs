//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Two snapshots of a player with different stats are still the same player;
/// compare `id()` when identity is what matters.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
