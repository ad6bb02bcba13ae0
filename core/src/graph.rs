//! Directed weighted graph over the navigable cells of a map.
//!
//! Cells live in an arena and are addressed by [`CellId`]. Every cell owns
//! its outgoing [`Edge`]s in insertion order; an edge stores the index of its
//! destination rather than a reference, so the graph has no ownership cycles
//! while path cycles remain representable.
//!
//! Each source holds at most one edge per destination. A second insertion for
//! the same pair is rejected with [`GraphError::DuplicateEdge`]; changing a
//! cost goes through [`CellGraph::set_edge_cost`] instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Vector2;

/// Largest number of cells a graph can hold; every id must fit in a `u32`.
pub const MAX_CELLS: u64 = u32::MAX as u64;

/// Stable arena index of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(u32);

impl CellId {
    /// Creates a cell identifier from its arena index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric arena index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Arena slot backing the cell, for dense per-cell tables.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Directed connection owned by its source cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    to: CellId,
    travel_cost: f32,
}

impl Edge {
    /// Destination cell.
    #[must_use]
    pub const fn to(&self) -> CellId {
        self.to
    }

    /// Non-negative, finite cost of traversing the edge.
    #[must_use]
    pub const fn travel_cost(&self) -> f32 {
        self.travel_cost
    }
}

/// Configuration errors raised while building or editing the graph.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GraphError {
    /// The edge cost was negative or not finite.
    #[error("edge {from:?} -> {to:?} has invalid travel cost {cost}")]
    InvalidEdgeCost {
        /// Source cell of the rejected edge.
        from: CellId,
        /// Destination cell of the rejected edge.
        to: CellId,
        /// Offending cost.
        cost: f32,
    },
    /// An edge between the two cells already exists.
    #[error("edge {from:?} -> {to:?} already exists")]
    DuplicateEdge {
        /// Source cell of the rejected edge.
        from: CellId,
        /// Destination cell of the rejected edge.
        to: CellId,
    },
    /// The cell is not part of the graph.
    #[error("cell {0:?} does not exist")]
    UnknownCell(CellId),
    /// No edge connects the two cells.
    #[error("edge {from:?} -> {to:?} does not exist")]
    MissingEdge {
        /// Source cell of the requested edge.
        from: CellId,
        /// Destination cell of the requested edge.
        to: CellId,
    },
    /// The arena would outgrow [`MAX_CELLS`].
    #[error("graph cannot grow to {requested} cells")]
    TooManyCells {
        /// Cell count the rejected operation would have produced.
        requested: u64,
    },
}

#[derive(Clone, Debug)]
struct Cell {
    position: Vector2,
    edges: Vec<Edge>,
}

/// Arena of cells and their outgoing edges.
#[derive(Clone, Debug, Default)]
pub struct CellGraph {
    cells: Vec<Cell>,
    generation: u64,
}

impl CellGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cell located at the provided world position.
    pub fn add_cell(&mut self, position: Vector2) -> Result<CellId, GraphError> {
        let _ = self.reserve_cells(1)?;
        let id = self.next_cell_id()?;
        self.cells.push(Cell {
            position,
            edges: Vec::new(),
        });
        self.bump_generation();
        Ok(id)
    }

    /// Appends a directed edge.
    ///
    /// Self-loops are accepted. A second edge between the same pair is
    /// rejected and leaves the graph untouched.
    pub fn add_edge(&mut self, from: CellId, to: CellId, cost: f32) -> Result<(), GraphError> {
        validate_cost(from, to, cost)?;
        self.ensure_cell(to)?;
        let cell = self.cell_mut(from)?;
        if cell.edges.iter().any(|edge| edge.to == to) {
            tracing::debug!(?from, ?to, "rejected duplicate edge");
            return Err(GraphError::DuplicateEdge { from, to });
        }

        cell.edges.push(Edge {
            to,
            travel_cost: cost,
        });
        self.bump_generation();
        Ok(())
    }

    /// Replaces the cost of an existing edge, keeping its position in the
    /// source cell's edge order.
    pub fn set_edge_cost(&mut self, from: CellId, to: CellId, cost: f32) -> Result<(), GraphError> {
        validate_cost(from, to, cost)?;
        self.ensure_cell(to)?;
        let edge = self
            .cell_mut(from)?
            .edges
            .iter_mut()
            .find(|edge| edge.to == to)
            .ok_or(GraphError::MissingEdge { from, to })?;
        edge.travel_cost = cost;
        self.bump_generation();
        Ok(())
    }

    /// Removes an existing edge, returning its former cost.
    pub fn remove_edge(&mut self, from: CellId, to: CellId) -> Result<f32, GraphError> {
        self.ensure_cell(to)?;
        let cell = self.cell_mut(from)?;
        let position = cell
            .edges
            .iter()
            .position(|edge| edge.to == to)
            .ok_or(GraphError::MissingEdge { from, to })?;
        let removed = cell.edges.remove(position);
        self.bump_generation();
        Ok(removed.travel_cost)
    }

    /// Builds a 4-connected grid of cells with symmetric edges of equal cost.
    ///
    /// Cells are allocated row-major and positioned `spacing` world units
    /// apart. Each cell lists its neighbours north, east, south, west. The
    /// returned identifiers are row-major as well.
    pub fn add_grid(
        &mut self,
        columns: u32,
        rows: u32,
        spacing: f32,
        cost: f32,
    ) -> Result<Vec<CellId>, GraphError> {
        let base = self.next_cell_id()?;
        validate_cost(base, base, cost)?;
        let count = self.reserve_cells(u64::from(columns) * u64::from(rows))?;

        let mut ids = Vec::with_capacity(count);
        for row in 0..rows {
            for column in 0..columns {
                let position = Vector2::new(column as f32 * spacing, row as f32 * spacing);
                ids.push(self.add_cell(position)?);
            }
        }

        let width = columns as usize;
        let at = |column: u32, row: u32| ids[row as usize * width + column as usize];
        for row in 0..rows {
            for column in 0..columns {
                let from = at(column, row);
                if let Some(north) = row.checked_sub(1) {
                    self.add_edge(from, at(column, north), cost)?;
                }
                if column + 1 < columns {
                    self.add_edge(from, at(column + 1, row), cost)?;
                }
                if row + 1 < rows {
                    self.add_edge(from, at(column, row + 1), cost)?;
                }
                if let Some(west) = column.checked_sub(1) {
                    self.add_edge(from, at(west, row), cost)?;
                }
            }
        }

        tracing::debug!(columns, rows, cells = ids.len(), "built grid");
        Ok(ids)
    }

    /// Outgoing edges of the cell as `(destination, cost)` in insertion order.
    ///
    /// Unknown cells have no neighbours.
    pub fn neighbors(&self, cell: CellId) -> impl Iterator<Item = (CellId, f32)> + '_ {
        self.cells
            .get(cell.index())
            .map(|cell| cell.edges.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|edge| (edge.to, edge.travel_cost))
    }

    /// Outgoing edge records of the cell.
    #[must_use]
    pub fn edges(&self, cell: CellId) -> &[Edge] {
        self.cells
            .get(cell.index())
            .map(|cell| cell.edges.as_slice())
            .unwrap_or_default()
    }

    /// Looks up the edge between two cells.
    #[must_use]
    pub fn edge(&self, from: CellId, to: CellId) -> Option<Edge> {
        self.edges(from).iter().copied().find(|edge| edge.to == to)
    }

    /// World position of the cell.
    #[must_use]
    pub fn position(&self, cell: CellId) -> Option<Vector2> {
        self.cells.get(cell.index()).map(|cell| cell.position)
    }

    /// Reports whether the cell exists.
    #[must_use]
    pub fn contains(&self, cell: CellId) -> bool {
        cell.index() < self.cells.len()
    }

    /// Number of cells in the arena.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of edges across all cells.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.cells.iter().map(|cell| cell.edges.len()).sum()
    }

    /// Iterator over every cell identifier in allocation order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> {
        // The arena never exceeds MAX_CELLS, so every index fits in a u32.
        (0..).map(CellId::new).take(self.cells.len())
    }

    /// Cell whose position is closest to the point, ties resolved by the lower id.
    #[must_use]
    pub fn nearest_cell(&self, point: Vector2) -> Option<CellId> {
        let mut best: Option<(CellId, f32)> = None;
        for (id, cell) in self.cell_ids().zip(&self.cells) {
            let distance = cell.position.distance_squared(point);
            if best.map_or(true, |(_, current)| distance < current) {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Counter bumped by every mutation.
    ///
    /// Routes remember the generation they were computed against so callers
    /// can tell when an edit has invalidated them.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Removes every cell and edge. The generation keeps counting.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.bump_generation();
    }

    /// Captures the graph as plain data.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        let cells = self.cells.iter().map(|cell| cell.position).collect();
        let edges = self
            .cell_ids()
            .zip(&self.cells)
            .flat_map(|(from, cell)| {
                cell.edges.iter().map(move |edge| EdgeRecord {
                    from,
                    to: edge.to,
                    cost: edge.travel_cost,
                })
            })
            .collect();
        GraphSnapshot { cells, edges }
    }

    /// Rebuilds a graph from a snapshot, validating every edge.
    ///
    /// Cell order and per-cell edge order are preserved, so routing over the
    /// rebuilt graph matches the original exactly.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        let _ = graph.reserve_cells(snapshot.cells.len() as u64)?;
        for &position in &snapshot.cells {
            let _ = graph.add_cell(position)?;
        }
        for record in &snapshot.edges {
            graph.add_edge(record.from, record.to, record.cost)?;
        }
        Ok(graph)
    }

    /// Checks that `additional` more cells fit, returning that count as a `usize`.
    fn reserve_cells(&self, additional: u64) -> Result<usize, GraphError> {
        let requested = (self.cells.len() as u64).saturating_add(additional);
        if requested > MAX_CELLS {
            tracing::warn!(requested, "rejected cell arena growth");
            return Err(GraphError::TooManyCells { requested });
        }
        usize::try_from(additional).map_err(|_| GraphError::TooManyCells { requested })
    }

    fn next_cell_id(&self) -> Result<CellId, GraphError> {
        u32::try_from(self.cells.len())
            .map(CellId::new)
            .map_err(|_| GraphError::TooManyCells {
                requested: self.cells.len() as u64 + 1,
            })
    }

    fn ensure_cell(&self, cell: CellId) -> Result<(), GraphError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(GraphError::UnknownCell(cell))
        }
    }

    fn cell_mut(&mut self, cell: CellId) -> Result<&mut Cell, GraphError> {
        self.cells
            .get_mut(cell.index())
            .ok_or(GraphError::UnknownCell(cell))
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

fn validate_cost(from: CellId, to: CellId, cost: f32) -> Result<(), GraphError> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(())
    } else {
        tracing::warn!(?from, ?to, cost, "rejected edge cost");
        Err(GraphError::InvalidEdgeCost { from, to, cost })
    }
}

/// Serializable description of a graph: cell positions and the edge list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Cell positions indexed by [`CellId`].
    pub cells: Vec<Vector2>,
    /// Edges grouped by source cell, each group in insertion order.
    pub edges: Vec<EdgeRecord>,
}

/// Single edge inside a [`GraphSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source cell.
    pub from: CellId,
    /// Destination cell.
    pub to: CellId,
    /// Travel cost.
    pub cost: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(count: usize) -> (CellGraph, Vec<CellId>) {
        let mut graph = CellGraph::new();
        let ids = (0..count)
            .map(|index| {
                graph
                    .add_cell(Vector2::new(index as f32, 0.0))
                    .expect("cell")
            })
            .collect();
        (graph, ids)
    }

    #[test]
    fn add_edge_appends_in_insertion_order() {
        let (mut graph, ids) = line(3);
        graph.add_edge(ids[0], ids[2], 5.0).expect("edge");
        graph.add_edge(ids[0], ids[1], 1.0).expect("edge");

        let neighbors: Vec<_> = graph.neighbors(ids[0]).collect();
        assert_eq!(neighbors, vec![(ids[2], 5.0), (ids[1], 1.0)]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn invalid_costs_are_rejected() {
        let (mut graph, ids) = line(2);
        for cost in [-1.0, f32::NAN, f32::INFINITY] {
            let error = graph.add_edge(ids[0], ids[1], cost).unwrap_err();
            assert!(matches!(error, GraphError::InvalidEdgeCost { .. }));
        }
        assert_eq!(graph.edge_count(), 0);
        graph.add_edge(ids[0], ids[1], 0.0).expect("zero cost is valid");
    }

    #[test]
    fn duplicate_edges_are_rejected_without_mutation() {
        let (mut graph, ids) = line(2);
        graph.add_edge(ids[0], ids[1], 1.0).expect("edge");
        let generation = graph.generation();

        assert_eq!(
            graph.add_edge(ids[0], ids[1], 3.0),
            Err(GraphError::DuplicateEdge {
                from: ids[0],
                to: ids[1],
            })
        );
        assert_eq!(graph.edge(ids[0], ids[1]).map(|edge| edge.travel_cost()), Some(1.0));
        assert_eq!(graph.generation(), generation);

        graph.add_edge(ids[1], ids[0], 3.0).expect("reverse edge is distinct");
    }

    #[test]
    fn unknown_cells_are_rejected() {
        let (mut graph, ids) = line(1);
        let ghost = CellId::new(7);
        assert_eq!(
            graph.add_edge(ids[0], ghost, 1.0),
            Err(GraphError::UnknownCell(ghost))
        );
        assert_eq!(
            graph.add_edge(ghost, ids[0], 1.0),
            Err(GraphError::UnknownCell(ghost))
        );
        assert_eq!(graph.neighbors(ghost).count(), 0);
    }

    #[test]
    fn self_loops_are_representable() {
        let (mut graph, ids) = line(1);
        graph.add_edge(ids[0], ids[0], 2.0).expect("self loop");
        assert_eq!(graph.neighbors(ids[0]).collect::<Vec<_>>(), vec![(ids[0], 2.0)]);
    }

    #[test]
    fn set_edge_cost_and_remove_edge_bump_generation() {
        let (mut graph, ids) = line(2);
        graph.add_edge(ids[0], ids[1], 1.0).expect("edge");

        let before = graph.generation();
        graph.set_edge_cost(ids[0], ids[1], 4.0).expect("update");
        assert!(graph.generation() > before);
        assert_eq!(graph.edge(ids[0], ids[1]).map(|edge| edge.travel_cost()), Some(4.0));

        assert_eq!(graph.remove_edge(ids[0], ids[1]), Ok(4.0));
        assert_eq!(
            graph.remove_edge(ids[0], ids[1]),
            Err(GraphError::MissingEdge {
                from: ids[0],
                to: ids[1],
            })
        );
        assert_eq!(
            graph.set_edge_cost(ids[0], ids[1], 1.0),
            Err(GraphError::MissingEdge {
                from: ids[0],
                to: ids[1],
            })
        );
    }

    #[test]
    fn grid_connects_cardinal_neighbours() {
        let mut graph = CellGraph::new();
        let ids = graph.add_grid(3, 2, 10.0, 1.0).expect("grid");

        assert_eq!(ids.len(), 6);
        assert_eq!(graph.position(ids[4]), Some(Vector2::new(10.0, 10.0)));
        // 3x2 grid: 7 undirected adjacencies, stored in both directions.
        assert_eq!(graph.edge_count(), 14);

        let center_top: Vec<_> = graph.neighbors(ids[1]).map(|(cell, _)| cell).collect();
        assert_eq!(center_top, vec![ids[2], ids[4], ids[0]]);
    }

    #[test]
    fn oversized_grids_are_rejected_before_allocating() {
        let mut graph = CellGraph::new();
        let _ = graph.add_cell(Vector2::ZERO).expect("cell");

        assert_eq!(
            graph.add_grid(u32::MAX, 2, 1.0, 1.0),
            Err(GraphError::TooManyCells {
                requested: 1 + 2 * u64::from(u32::MAX),
            })
        );
        assert_eq!(
            graph.add_grid(u32::MAX, 1, 1.0, 1.0),
            Err(GraphError::TooManyCells {
                requested: 1 + u64::from(u32::MAX),
            })
        );
        assert_eq!(graph.cell_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn nearest_cell_prefers_lower_id_on_ties() {
        let (graph, ids) = line(3);
        assert_eq!(graph.nearest_cell(Vector2::new(1.2, 3.0)), Some(ids[1]));
        assert_eq!(graph.nearest_cell(Vector2::new(0.5, 0.0)), Some(ids[0]));
        assert_eq!(CellGraph::new().nearest_cell(Vector2::ZERO), None);
    }

    #[test]
    fn snapshot_round_trip_preserves_order() {
        let (mut graph, ids) = line(3);
        graph.add_edge(ids[0], ids[2], 5.0).expect("edge");
        graph.add_edge(ids[0], ids[1], 1.0).expect("edge");
        graph.add_edge(ids[1], ids[2], 1.0).expect("edge");

        let snapshot = graph.snapshot();
        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: GraphSnapshot = bincode::deserialize(&bytes).expect("deserialize");
        let rebuilt = CellGraph::from_snapshot(&restored).expect("rebuild");

        assert_eq!(rebuilt.snapshot(), snapshot);
        for id in graph.cell_ids() {
            assert_eq!(
                rebuilt.neighbors(id).collect::<Vec<_>>(),
                graph.neighbors(id).collect::<Vec<_>>()
            );
            assert_eq!(rebuilt.position(id), graph.position(id));
        }
    }

    #[test]
    fn from_snapshot_rejects_bad_edges() {
        let snapshot = GraphSnapshot {
            cells: vec![Vector2::ZERO],
            edges: vec![EdgeRecord {
                from: CellId::new(0),
                to: CellId::new(1),
                cost: 1.0,
            }],
        };
        assert_eq!(
            CellGraph::from_snapshot(&snapshot).unwrap_err(),
            GraphError::UnknownCell(CellId::new(1))
        );
    }
}
