#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Outpost map engine.
//!
//! This crate defines the spatial primitives every other crate builds on:
//! vector arithmetic, the closed set of hit-area shapes used for picking and
//! collision, and the weighted cell graph that routes units across the map.
//! The authoritative map context lives in `outpost-world`, shortest-path
//! queries live in `outpost-system-routing`, and adapters only ever observe
//! the read-only values exported here.

pub mod geometry;
pub mod graph;
pub mod hit_area;

use serde::{Deserialize, Serialize};

pub use geometry::Vector2;
pub use graph::{CellGraph, CellId, Edge, EdgeRecord, GraphError, GraphSnapshot, MAX_CELLS};
pub use hit_area::{HitArea, Rect, Shape, ShapeError};

/// Unique identifier assigned to an object placed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new object identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Draw-order key handed out in placement order.
///
/// The index carries no spatial meaning. Renderers sort by it and nothing
/// else; a larger value was placed later and is drawn on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SortIndex(u64);

impl SortIndex {
    /// Wraps a raw placement index.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the raw placement index.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Categories of objects that may be placed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Defensive structure that occupies a cell.
    Tower,
    /// Cell where enemy units enter the map.
    SpawnPoint,
    /// Cell enemy units try to reach.
    Goal,
    /// Purely cosmetic object that still participates in picking.
    Decoration,
}
