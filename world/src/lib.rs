#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative map state for Outpost.
//!
//! [`World`] is the explicit context handed to map construction and
//! placement code. It owns the cell graph, the placement order allocator, the
//! game counters and every placed object, so separate worlds never share
//! state. Read access for systems and adapters goes through [`query`].

mod objects;
mod placement;
mod state;

use outpost_core::{
    CellGraph, CellId, GraphError, HitArea, ObjectId, ObjectKind, Shape, ShapeError, Vector2,
};
use thiserror::Error;

pub use objects::PlacedObject;
pub use placement::PlacementOrder;
pub use state::GameState;

use objects::ObjectRegistry;

/// Construction parameters for a [`World`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldConfig {
    placement_base: u64,
}

impl WorldConfig {
    /// Creates a configuration whose first placed object receives `placement_base`.
    #[must_use]
    pub const fn new(placement_base: u64) -> Self {
        Self { placement_base }
    }

    /// First sort index handed out after construction or reset.
    #[must_use]
    pub const fn placement_base(&self) -> u64 {
        self.placement_base
    }
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum PlacementError {
    /// The target cell is not part of the map graph.
    #[error("cell {0:?} does not exist")]
    UnknownCell(CellId),
    /// No object with the provided identifier exists.
    #[error("object {0:?} does not exist")]
    UnknownObject(ObjectId),
    /// The requested hit area is degenerate.
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// Every sort index up to `u64::MAX` has been handed out.
    #[error("placement order is exhausted")]
    OrderExhausted,
}

/// Represents the authoritative map state.
#[derive(Debug)]
pub struct World {
    graph: CellGraph,
    order: PlacementOrder,
    state: GameState,
    objects: ObjectRegistry,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            graph: CellGraph::new(),
            order: PlacementOrder::new(config.placement_base()),
            state: GameState::new(),
            objects: ObjectRegistry::new(),
        }
    }

    /// Mutable access to the graph for the map-building phase.
    ///
    /// Edits bump the graph generation, which invalidates routes computed
    /// earlier.
    pub fn graph_mut(&mut self) -> &mut CellGraph {
        &mut self.graph
    }

    /// Adds a navigable cell at the provided position.
    pub fn add_cell(&mut self, position: Vector2) -> Result<CellId, GraphError> {
        self.graph.add_cell(position)
    }

    /// Registers a directed edge between two cells.
    pub fn add_edge(&mut self, from: CellId, to: CellId, cost: f32) -> Result<(), GraphError> {
        self.graph.add_edge(from, to, cost)
    }

    /// Places an object on a cell, centering its hit area on the cell.
    ///
    /// A sort index is only consumed when the placement succeeds.
    pub fn place(
        &mut self,
        kind: ObjectKind,
        cell: CellId,
        shape: Shape,
    ) -> Result<ObjectId, PlacementError> {
        let position = self
            .graph
            .position(cell)
            .ok_or(PlacementError::UnknownCell(cell))?;
        let hit_area = HitArea::new(shape, position)?;
        let sort_index = self
            .order
            .next_index()
            .ok_or(PlacementError::OrderExhausted)?;

        let id = self.objects.allocate_id();
        self.objects.insert(PlacedObject {
            id,
            kind,
            cell,
            hit_area,
            sort_index,
        });
        tracing::debug!(?id, ?kind, ?cell, sort_index = sort_index.get(), "placed object");
        Ok(id)
    }

    /// Moves an object's hit area to a new origin.
    ///
    /// The object keeps its cell and sort index.
    pub fn move_object(&mut self, id: ObjectId, origin: Vector2) -> Result<(), PlacementError> {
        let object = self
            .objects
            .get_mut(id)
            .ok_or(PlacementError::UnknownObject(id))?;
        object.hit_area.set_origin(origin);
        Ok(())
    }

    /// Removes an object. Its sort index is not handed out again.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<PlacedObject, PlacementError> {
        self.objects
            .remove(id)
            .ok_or(PlacementError::UnknownObject(id))
    }

    /// Mutable access to the game counters.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Full map rebuild: drops cells, edges, objects and counters and
    /// restarts the placement order at its base.
    pub fn reset(&mut self) {
        self.graph.clear();
        self.objects.clear();
        self.state.reset();
        self.order.reset();
        tracing::debug!("world reset");
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use outpost_core::{CellGraph, CellId, ObjectId, ObjectKind, SortIndex, Vector2};

    use super::{GameState, PlacedObject, World};

    /// Read-only access to the map graph.
    #[must_use]
    pub fn graph(world: &World) -> &CellGraph {
        &world.graph
    }

    /// Read-only access to the game counters.
    #[must_use]
    pub fn game_state(world: &World) -> &GameState {
        &world.state
    }

    /// Sort index the next placed object will receive, `None` once the
    /// placement order is exhausted.
    #[must_use]
    pub fn next_sort_index(world: &World) -> Option<SortIndex> {
        world.order.peek()
    }

    /// Looks up a placed object.
    #[must_use]
    pub fn object(world: &World, id: ObjectId) -> Option<&PlacedObject> {
        world.objects.get(id)
    }

    /// All placed objects in identifier order.
    pub fn objects(world: &World) -> impl Iterator<Item = &PlacedObject> {
        world.objects.iter()
    }

    /// Cells holding objects of the provided kind, in identifier order.
    #[must_use]
    pub fn cells_of_kind(world: &World, kind: ObjectKind) -> Vec<CellId> {
        world
            .objects
            .iter()
            .filter(|object| object.kind() == kind)
            .map(PlacedObject::cell)
            .collect()
    }

    /// Placed objects ordered for drawing, back to front.
    #[must_use]
    pub fn draw_order(world: &World) -> Vec<&PlacedObject> {
        let mut ordered: Vec<_> = world.objects.iter().collect();
        ordered.sort_by_key(|object| object.sort_index());
        ordered
    }

    /// Every object whose hit area contains the point, back to front.
    #[must_use]
    pub fn objects_containing(world: &World, point: Vector2) -> Vec<ObjectId> {
        draw_order(world)
            .into_iter()
            .filter(|object| object.hit_area().contains_point(point))
            .map(PlacedObject::id)
            .collect()
    }

    /// Topmost object under the point, i.e. the hit drawn last.
    #[must_use]
    pub fn pick(world: &World, point: Vector2) -> Option<ObjectId> {
        world
            .objects
            .iter()
            .filter(|object| object.hit_area().contains_point(point))
            .max_by_key(|object| object.sort_index())
            .map(PlacedObject::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::SortIndex;

    #[test]
    fn placement_consumes_sort_index_only_on_success() {
        let mut world = World::new(WorldConfig::new(100));
        let cell = world.add_cell(Vector2::new(4.0, 4.0)).expect("cell");

        assert_eq!(
            world.place(ObjectKind::Tower, CellId::new(9), Shape::Circle { radius: 1.0 }),
            Err(PlacementError::UnknownCell(CellId::new(9)))
        );
        assert_eq!(
            world.place(ObjectKind::Tower, cell, Shape::Square { size: 0.0 }),
            Err(PlacementError::Shape(ShapeError::Degenerate { extent: 0.0 }))
        );

        let id = world
            .place(ObjectKind::Tower, cell, Shape::Square { size: 2.0 })
            .expect("placement");
        let object = query::object(&world, id).expect("object");
        assert_eq!(object.sort_index().get(), 100);
        assert_eq!(object.hit_area().origin(), Vector2::new(4.0, 4.0));
    }

    #[test]
    fn move_object_recomputes_hit_area() {
        let mut world = World::default();
        let cell = world.add_cell(Vector2::ZERO).expect("cell");
        let id = world
            .place(ObjectKind::SpawnPoint, cell, Shape::Circle { radius: 1.0 })
            .expect("placement");

        world
            .move_object(id, Vector2::new(10.0, 0.0))
            .expect("move");
        assert_eq!(query::pick(&world, Vector2::ZERO), None);
        assert_eq!(query::pick(&world, Vector2::new(10.5, 0.0)), Some(id));
        assert_eq!(
            world.move_object(ObjectId::new(42), Vector2::ZERO),
            Err(PlacementError::UnknownObject(ObjectId::new(42)))
        );
    }

    #[test]
    fn reset_clears_map_and_restarts_order() {
        let mut world = World::default();
        let cell = world.add_cell(Vector2::ZERO).expect("cell");
        let _ = world
            .place(ObjectKind::Goal, cell, Shape::Circle { radius: 1.0 })
            .expect("placement");
        let _ = world.state_mut().add("gold", 10);

        world.reset();

        assert_eq!(query::graph(&world).cell_count(), 0);
        assert_eq!(query::objects(&world).count(), 0);
        assert_eq!(query::game_state(&world).get("gold"), 0);
        assert_eq!(query::next_sort_index(&world), Some(SortIndex::new(0)));
    }

    #[test]
    fn placement_at_the_top_of_the_order_is_rejected_not_wrapped() {
        let mut world = World::new(WorldConfig::new(u64::MAX));
        let cell = world.add_cell(Vector2::ZERO).expect("cell");
        let shape = Shape::Circle { radius: 1.0 };

        let last = world.place(ObjectKind::Tower, cell, shape).expect("placement");
        assert_eq!(
            query::object(&world, last).map(PlacedObject::sort_index),
            Some(SortIndex::new(u64::MAX))
        );
        assert_eq!(
            world.place(ObjectKind::Tower, cell, shape),
            Err(PlacementError::OrderExhausted)
        );
        assert_eq!(query::objects(&world).count(), 1);
        assert_eq!(query::next_sort_index(&world), None);
    }
}
