//! Incremental traversal of a computed route.

use std::time::Duration;

use outpost_core::{CellId, Vector2};

use crate::Route;

/// Cursor a moving unit keeps along its route.
///
/// Speed is measured in travel-cost units per second, so a segment of cost
/// `c` takes `c / speed` seconds regardless of its geometric length. The
/// rendered position interpolates linearly between the two waypoints of the
/// current segment.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteFollower {
    route: Route,
    segment: usize,
    progress: f32,
    speed: f32,
}

impl RouteFollower {
    /// Starts following `route` from its first waypoint.
    ///
    /// Negative or non-finite speeds are treated as standing still.
    #[must_use]
    pub fn new(route: Route, speed: f32) -> Self {
        let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        Self {
            route,
            segment: 0,
            progress: 0.0,
            speed,
        }
    }

    /// Advances along the route by `dt` of simulated time.
    ///
    /// Returns the number of waypoints reached during the step. Zero-cost
    /// segments are crossed immediately.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let mut budget = self.speed * dt.as_secs_f32();
        let mut reached = 0;

        while let Some(next) = self.route.waypoints().get(self.segment + 1) {
            let cost = next.segment_cost;
            let remaining = (1.0 - self.progress) * cost;
            if cost <= 0.0 || budget >= remaining {
                budget -= remaining;
                self.segment += 1;
                self.progress = 0.0;
                reached += 1;
            } else {
                self.progress += budget / cost;
                break;
            }
        }

        reached
    }

    /// Interpolated world position of the unit.
    #[must_use]
    pub fn position(&self) -> Vector2 {
        let waypoints = self.route.waypoints();
        let from = waypoints[self.segment].position;
        match waypoints.get(self.segment + 1) {
            Some(to) => from.lerp(to.position, self.progress),
            None => from,
        }
    }

    /// Cell of the waypoint most recently reached.
    #[must_use]
    pub fn current_cell(&self) -> CellId {
        self.route.waypoints()[self.segment].cell
    }

    /// Cell the unit is heading to, `None` once the goal is reached.
    #[must_use]
    pub fn next_cell(&self) -> Option<CellId> {
        self.route
            .waypoints()
            .get(self.segment + 1)
            .map(|waypoint| waypoint.cell)
    }

    /// Reports whether the unit stands on the goal.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.segment + 1 >= self.route.len()
    }

    /// Index of the waypoint the current segment starts at.
    #[must_use]
    pub const fn segment_index(&self) -> usize {
        self.segment
    }

    /// Fraction of the current segment already covered, in `0.0..1.0`.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Travel cost left until the goal.
    #[must_use]
    pub fn remaining_cost(&self) -> f64 {
        let waypoints = self.route.waypoints();
        let Some(next) = waypoints.get(self.segment + 1) else {
            return 0.0;
        };
        let rest: f64 = waypoints[self.segment + 2..]
            .iter()
            .map(|waypoint| f64::from(waypoint.segment_cost))
            .sum();
        f64::from(1.0 - self.progress) * f64::from(next.segment_cost) + rest
    }

    /// Route being followed.
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    /// Units of travel cost covered per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    pub(crate) fn replace_route(&mut self, route: Route) {
        self.route = route;
        self.segment = 0;
        self.progress = 0.0;
    }
}
