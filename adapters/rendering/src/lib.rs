#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Outpost adapters.
//!
//! Adapters never touch the world directly. They receive a [`Scene`] whose
//! placements are already ordered by sort index and whose unit markers carry
//! interpolated positions, and they hand pointer positions back as
//! [`Vector2`] values for picking.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use outpost_core::{ObjectId, ObjectKind, Shape, SortIndex, Vector2};
use outpost_system_routing::RouteFollower;
use outpost_world::{query, World};

/// Converts a core vector into the rendering math type.
#[must_use]
pub fn to_vec2(vector: Vector2) -> Vec2 {
    Vec2::new(vector.x, vector.y)
}

/// Converts a cursor position in world units into a core vector.
#[must_use]
pub fn from_vec2(vector: Vec2) -> Vector2 {
    Vector2::new(vector.x, vector.y)
}

/// Outline drawn for a placed object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outline {
    /// Circle with the provided radius in world units.
    Circle {
        /// Radius of the outline.
        radius: f32,
    },
    /// Axis-aligned square with the provided half side length.
    Square {
        /// Half of the side length.
        half_extent: f32,
    },
}

impl From<Shape> for Outline {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Circle { radius } => Self::Circle { radius },
            Shape::Square { size } => Self::Square {
                half_extent: size / 2.0,
            },
        }
    }
}

/// Placed object prepared for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePlacement {
    /// Identifier of the placed object.
    pub id: ObjectId,
    /// Category of the object.
    pub kind: ObjectKind,
    /// Draw-order key; higher values are drawn later.
    pub sort_index: SortIndex,
    /// Center of the object in world units.
    pub position: Vec2,
    /// Outline matching the object's hit area.
    pub outline: Outline,
}

/// Moving unit prepared for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneUnit {
    /// Interpolated position in world units.
    pub position: Vec2,
    /// Unit direction towards the next waypoint, if any.
    pub heading: Option<Vec2>,
}

impl SceneUnit {
    /// Captures the presentation state of a route follower.
    #[must_use]
    pub fn from_follower(follower: &RouteFollower) -> Self {
        let position = to_vec2(follower.position());
        let heading = follower
            .route()
            .waypoints()
            .get(follower.segment_index() + 1)
            .and_then(|next| (to_vec2(next.position) - position).try_normalize());
        Self { position, heading }
    }
}

/// Everything a backend needs to draw a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Placed objects, back to front.
    pub placements: Vec<ScenePlacement>,
    /// Units drawn above every placement.
    pub units: Vec<SceneUnit>,
}

impl Scene {
    /// Captures the world's placed objects in draw order.
    #[must_use]
    pub fn from_world(world: &World) -> Self {
        let placements = query::draw_order(world)
            .into_iter()
            .map(|object| ScenePlacement {
                id: object.id(),
                kind: object.kind(),
                sort_index: object.sort_index(),
                position: to_vec2(object.hit_area().origin()),
                outline: object.hit_area().shape().into(),
            })
            .collect();
        Self {
            placements,
            units: Vec::new(),
        }
    }

    /// Replaces the unit markers with the current follower states.
    pub fn set_units<'a>(&mut self, followers: impl IntoIterator<Item = &'a RouteFollower>) {
        self.units.clear();
        self.units
            .extend(followers.into_iter().map(SceneUnit::from_follower));
    }
}

/// Interface implemented by concrete rendering backends.
pub trait RenderingBackend {
    /// Runs the backend until `update_scene` asks it to stop.
    ///
    /// The closure receives the simulated frame delta and may mutate the
    /// scene before it is drawn. Returning `false` ends the loop after the
    /// current frame.
    fn run<F>(self, scene: Scene, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_system_routing::PathRouter;

    #[test]
    fn scene_lists_placements_in_sort_order() {
        let mut world = World::default();
        let a = world.add_cell(Vector2::new(1.0, 2.0)).expect("cell");
        let b = world.add_cell(Vector2::new(5.0, 2.0)).expect("cell");
        let first = world
            .place(ObjectKind::Tower, b, Shape::Square { size: 2.0 })
            .expect("placement");
        let second = world
            .place(ObjectKind::Goal, a, Shape::Circle { radius: 0.5 })
            .expect("placement");

        let scene = Scene::from_world(&world);
        let ids: Vec<_> = scene.placements.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(scene.placements[0].position, Vec2::new(5.0, 2.0));
        assert_eq!(
            scene.placements[0].outline,
            Outline::Square { half_extent: 1.0 }
        );
    }

    #[test]
    fn units_face_their_next_waypoint() {
        let mut world = World::default();
        let a = world.add_cell(Vector2::ZERO).expect("cell");
        let b = world.add_cell(Vector2::new(0.0, 3.0)).expect("cell");
        world.add_edge(a, b, 1.0).expect("edge");

        let route = PathRouter::new()
            .find_path(query::graph(&world), a, b)
            .expect("cells exist")
            .expect("route exists");
        let follower = RouteFollower::new(route, 1.0);

        let mut scene = Scene::from_world(&world);
        scene.set_units([&follower]);

        assert_eq!(scene.units.len(), 1);
        assert_eq!(scene.units[0].position, Vec2::ZERO);
        assert_eq!(scene.units[0].heading, Some(Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn vector_conversions_round_trip() {
        let point = Vector2::new(-2.5, 7.0);
        assert_eq!(from_vec2(to_vec2(point)), point);
    }
}
