//! Authoritative placed-object state management utilities.

use std::collections::BTreeMap;

use placement_sandbox_core::{Footprint, ObjectId, PrototypeId, Transform2D};

/// Snapshot of a placed object stored inside the scene.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlacedObject {
    /// Identifier allocated by the scene for the object.
    pub(crate) id: ObjectId,
    /// Prototype the object was instantiated from.
    pub(crate) prototype: PrototypeId,
    /// Live transform of the object.
    pub(crate) transform: Transform2D,
    /// Collision envelope copied from the prototype at instantiation.
    pub(crate) footprint: Footprint,
}

/// Registry that stores placed objects and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ObjectRegistry {
    entries: BTreeMap<ObjectId, PlacedObject>,
    /// `None` once every identifier has been handed out.
    next_object_id: Option<ObjectId>,
}

impl ObjectRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_object_id: Some(ObjectId::new(0)),
        }
    }

    /// Stores a new object and returns the identifier allocated for it.
    ///
    /// Returns `None` without storing anything once the identifier space is
    /// used up, so a live object is never overwritten.
    pub(crate) fn insert(
        &mut self,
        prototype: PrototypeId,
        transform: Transform2D,
        footprint: Footprint,
    ) -> Option<ObjectId> {
        let id = self.next_object_id?;
        self.next_object_id = id.get().checked_add(1).map(ObjectId::new);
        let _ = self.entries.insert(
            id,
            PlacedObject {
                id,
                prototype,
                transform,
                footprint,
            },
        );
        Some(id)
    }

    pub(crate) fn remove(&mut self, id: ObjectId) -> Option<PlacedObject> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ObjectId) -> Option<&mut PlacedObject> {
        self.entries.get_mut(&id)
    }

    /// Objects in identifier order, which is also instantiation order.
    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &PlacedObject> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn skip_to(&mut self, next: ObjectId) {
        self.next_object_id = Some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = ObjectRegistry::new();
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.next_object_id, Some(ObjectId::new(0)));
    }

    #[test]
    fn identifiers_are_never_reused_after_removal() {
        let mut registry = ObjectRegistry::new();
        let crate_id = PrototypeId::new("crate");
        let first = registry
            .insert(crate_id.clone(), Transform2D::default(), Footprint::new(1.0, 1.0))
            .expect("identifier available");
        assert!(registry.remove(first).is_some());
        let second = registry
            .insert(crate_id, Transform2D::default(), Footprint::new(1.0, 1.0))
            .expect("identifier available");
        assert_ne!(first, second);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn placed_object_preserves_constructor_fields() {
        let mut registry = ObjectRegistry::new();
        let transform = Transform2D::new(1.0, 0.0, 2.0, 45.0);
        let id = registry
            .insert(PrototypeId::new("bench"), transform, Footprint::new(1.5, 0.5))
            .expect("identifier available");
        let stored = registry.get(id).expect("object stored");

        assert_eq!(stored.id, id);
        assert_eq!(stored.prototype, PrototypeId::new("bench"));
        assert_eq!(stored.transform, transform);
        assert_eq!(stored.footprint, Footprint::new(1.5, 0.5));
    }

    #[test]
    fn exhausted_identifiers_never_overwrite_the_last_object() {
        let mut registry = ObjectRegistry::new();
        registry.skip_to(ObjectId::new(u32::MAX));
        let last = registry
            .insert(PrototypeId::new("crate"), Transform2D::default(), Footprint::new(1.0, 1.0))
            .expect("last identifier is usable");
        assert_eq!(last, ObjectId::new(u32::MAX));

        let moved = Transform2D::on_plane(5.0, 5.0);
        assert_eq!(
            registry.insert(PrototypeId::new("bench"), moved, Footprint::new(1.5, 0.5)),
            None
        );
        assert_eq!(registry.len(), 1);
        let stored = registry.get(last).expect("last object kept");
        assert_eq!(stored.prototype, PrototypeId::new("crate"));
        assert_eq!(stored.transform, Transform2D::default());
    }
}
