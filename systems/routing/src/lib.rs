#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic shortest-path routing over the map cell graph.
//!
//! [`PathRouter`] answers least-cost queries with Dijkstra's algorithm and
//! hands back a [`Route`]. Units consume routes through a [`RouteFollower`].
//! Neither the graph nor the router ever observes unit state: re-pathing
//! happens only when the caller asks for it.

mod follower;

use std::{cmp::Ordering, collections::BinaryHeap};

use outpost_core::{CellGraph, CellId, GraphError, Vector2};

pub use follower::RouteFollower;

/// Single stop along a route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    /// Cell visited at this stop.
    pub cell: CellId,
    /// World position of the cell when the route was computed.
    pub position: Vector2,
    /// Travel cost of the edge entering this stop; zero for the first one.
    pub segment_cost: f32,
}

/// Least-cost sequence of cells from a start to a goal.
///
/// A route is static once computed. It remembers the graph generation it was
/// computed against so callers can detect later edits.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    waypoints: Vec<Waypoint>,
    total_cost: f64,
    generation: u64,
}

impl Route {
    /// Stops from start to goal, both included.
    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Cells visited from start to goal.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.waypoints.iter().map(|waypoint| waypoint.cell)
    }

    /// First cell of the route.
    #[must_use]
    pub fn start(&self) -> CellId {
        // Routes always hold at least the start waypoint.
        self.waypoints[0].cell
    }

    /// Last cell of the route.
    #[must_use]
    pub fn goal(&self) -> CellId {
        self.waypoints[self.waypoints.len() - 1].cell
    }

    /// Number of waypoints, including start and goal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false; a route contains at least its start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Sum of the segment costs, accumulated in double precision.
    #[must_use]
    pub const fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Graph generation the route was computed against.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Reports whether the graph was edited after the route was computed.
    #[must_use]
    pub fn is_stale(&self, graph: &CellGraph) -> bool {
        graph.generation() != self.generation
    }
}

/// Dijkstra path router that reuses scratch buffers across queries.
///
/// Equal-cost candidates are resolved by discovery order: the frontier pops
/// the earliest-pushed entry among equal costs, and a cell's predecessor is
/// only replaced by a strictly cheaper one. Identical graphs therefore always
/// yield identical routes.
///
/// Edge costs are `f32`, but path costs are summed as `f64` so that long or
/// expensive paths neither overflow nor lose the cheaper edges to rounding.
#[derive(Debug, Default)]
pub struct PathRouter {
    costs: Vec<f64>,
    previous: Vec<Option<CellId>>,
    settled: Vec<bool>,
    frontier: BinaryHeap<FrontierEntry>,
    sequence: u64,
}

impl PathRouter {
    /// Creates a router with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the least-cost route from `start` to `goal`.
    ///
    /// Returns `Ok(None)` when the goal is unreachable; that is an ordinary
    /// outcome the caller handles by holding position or despawning. Errors
    /// are reserved for cells that are not part of the graph.
    pub fn find_path(
        &mut self,
        graph: &CellGraph,
        start: CellId,
        goal: CellId,
    ) -> Result<Option<Route>, GraphError> {
        for cell in [start, goal] {
            if !graph.contains(cell) {
                return Err(GraphError::UnknownCell(cell));
            }
        }

        self.prepare(graph.cell_count());
        self.costs[start.index()] = 0.0;
        self.push(start, 0.0);

        while let Some(entry) = self.frontier.pop() {
            let current = entry.cell;
            if self.settled[current.index()] {
                continue;
            }
            self.settled[current.index()] = true;

            if current == goal {
                break;
            }

            for (next, cost) in graph.neighbors(current) {
                if self.settled[next.index()] {
                    continue;
                }

                let candidate = entry.cost + f64::from(cost);
                if candidate < self.costs[next.index()] {
                    self.costs[next.index()] = candidate;
                    self.previous[next.index()] = Some(current);
                    self.push(next, candidate);
                }
            }
        }

        if !self.settled[goal.index()] {
            tracing::debug!(?start, ?goal, "goal unreachable");
            return Ok(None);
        }

        let route = self.reconstruct(graph, start, goal)?;
        tracing::debug!(
            ?start,
            ?goal,
            waypoints = route.len(),
            cost = route.total_cost(),
            "route found"
        );
        Ok(Some(route))
    }

    /// Recomputes the follower's route from its current cell.
    ///
    /// On success the follower restarts at that cell on the new route and
    /// `Ok(true)` is returned. When the goal has become unreachable the
    /// follower keeps its previous route and `Ok(false)` is returned.
    pub fn repath(
        &mut self,
        graph: &CellGraph,
        follower: &mut RouteFollower,
        goal: CellId,
    ) -> Result<bool, GraphError> {
        match self.find_path(graph, follower.current_cell(), goal)? {
            Some(route) => {
                follower.replace_route(route);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn prepare(&mut self, cell_count: usize) {
        self.costs.clear();
        self.costs.resize(cell_count, f64::INFINITY);
        self.previous.clear();
        self.previous.resize(cell_count, None);
        self.settled.clear();
        self.settled.resize(cell_count, false);
        self.frontier.clear();
        self.sequence = 0;
    }

    fn push(&mut self, cell: CellId, cost: f64) {
        self.frontier.push(FrontierEntry {
            cost,
            sequence: self.sequence,
            cell,
        });
        self.sequence += 1;
    }

    fn reconstruct(
        &self,
        graph: &CellGraph,
        start: CellId,
        goal: CellId,
    ) -> Result<Route, GraphError> {
        let mut cells = vec![goal];
        let mut cursor = goal;
        while cursor != start {
            let Some(previous) = self.previous[cursor.index()] else {
                break;
            };
            cells.push(previous);
            cursor = previous;
        }
        cells.reverse();

        let mut waypoints = Vec::with_capacity(cells.len());
        let mut entered_from: Option<CellId> = None;
        for cell in cells {
            let position = graph.position(cell).ok_or(GraphError::UnknownCell(cell))?;
            let segment_cost = match entered_from {
                Some(from) => graph
                    .edge(from, cell)
                    .ok_or(GraphError::MissingEdge { from, to: cell })?
                    .travel_cost(),
                None => 0.0,
            };
            waypoints.push(Waypoint {
                cell,
                position,
                segment_cost,
            });
            entered_from = Some(cell);
        }

        Ok(Route {
            waypoints,
            total_cost: self.costs[goal.index()],
            generation: graph.generation(),
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    cost: f64,
    sequence: u64,
    cell: CellId,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the cheapest, then earliest, entry.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontier_pops_cheapest_then_earliest() {
        let mut heap = BinaryHeap::new();
        for (sequence, cost) in [(0, 2.0), (1, 1.0), (2, 1.0), (3, 0.5)] {
            heap.push(FrontierEntry {
                cost,
                sequence,
                cell: CellId::new(sequence as u32),
            });
        }

        let order: Vec<_> = std::iter::from_fn(|| heap.pop())
            .map(|entry| entry.sequence)
            .collect();
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn scratch_buffers_are_reset_between_queries() {
        let mut graph = CellGraph::new();
        let a = graph.add_cell(Vector2::ZERO).expect("cell");
        let b = graph.add_cell(Vector2::new(1.0, 0.0)).expect("cell");
        graph.add_edge(a, b, 1.0).expect("edge");

        let mut router = PathRouter::new();
        assert!(router.find_path(&graph, a, b).expect("query").is_some());
        assert!(router.find_path(&graph, b, a).expect("query").is_none());
        assert!(router.find_path(&graph, a, b).expect("query").is_some());
    }
}
