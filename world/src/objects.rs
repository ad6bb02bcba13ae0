//! Registry of objects placed on the map.

use std::collections::BTreeMap;

use outpost_core::{CellId, HitArea, ObjectId, ObjectKind, SortIndex};

/// Object placed on the map together with its hit area and draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedObject {
    pub(crate) id: ObjectId,
    pub(crate) kind: ObjectKind,
    pub(crate) cell: CellId,
    pub(crate) hit_area: HitArea,
    pub(crate) sort_index: SortIndex,
}

impl PlacedObject {
    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Category of the object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Cell the object was placed on.
    #[must_use]
    pub const fn cell(&self) -> CellId {
        self.cell
    }

    /// Shape used for picking and collision.
    #[must_use]
    pub const fn hit_area(&self) -> &HitArea {
        &self.hit_area
    }

    /// Draw-order key assigned at placement.
    #[must_use]
    pub const fn sort_index(&self) -> SortIndex {
        self.sort_index
    }
}

/// Stores placed objects and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ObjectRegistry {
    entries: BTreeMap<ObjectId, PlacedObject>,
    next_object_id: ObjectId,
}

impl ObjectRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_object_id: ObjectId::new(0),
        }
    }

    pub(crate) fn allocate_id(&mut self) -> ObjectId {
        let id = self.next_object_id;
        self.next_object_id = ObjectId::new(id.get() + 1);
        id
    }

    pub(crate) fn insert(&mut self, object: PlacedObject) {
        let _ = self.entries.insert(object.id, object);
    }

    pub(crate) fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ObjectId) -> Option<&mut PlacedObject> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ObjectId) -> Option<PlacedObject> {
        self.entries.remove(&id)
    }

    /// Objects in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &PlacedObject> {
        self.entries.values()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_object_id = ObjectId::new(0);
    }
}
