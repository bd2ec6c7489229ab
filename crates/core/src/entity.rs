//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Backend resources that carry an `id` implement this so listings can be
/// updated in place (e.g. dropping a deleted row without a re-fetch).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Remove the entity with `id` from `items`, returning it if present.
pub fn remove_by_id<E: Entity>(items: &mut Vec<E>, id: &E::Id) -> Option<E> {
    let pos = items.iter().position(|e| e.id() == id)?;
    Some(items.remove(pos))
}
