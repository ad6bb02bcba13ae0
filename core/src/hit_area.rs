//! Hit areas answering point-containment queries for picking and collision.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Vector2;

/// Closed set of shapes a hit area may take.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Disc centered on the origin.
    Circle {
        /// Distance from the origin to the boundary.
        radius: f32,
    },
    /// Axis-aligned square centered on the origin.
    Square {
        /// Side length.
        size: f32,
    },
}

/// Reasons a hit area cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ShapeError {
    /// Radius or size was zero, negative or not finite.
    #[error("shape extent {extent} must be positive and finite")]
    Degenerate {
        /// Offending radius or size.
        extent: f32,
    },
}

/// Axis-aligned rectangle given by its inclusive corners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl Rect {
    /// Builds the rectangle spanning `half` in every direction around `center`.
    #[must_use]
    pub fn around(center: Vector2, half: f32) -> Self {
        Self {
            x1: center.x - half,
            y1: center.y - half,
            x2: center.x + half,
            y2: center.y + half,
        }
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: Vector2) -> bool {
        self.x1 <= point.x && point.x <= self.x2 && self.y1 <= point.y && point.y <= self.y2
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Derived {
    Circle { radius: f32, radius_squared: f32 },
    Square { bounds: Rect },
}

/// Shape anchored at an origin with its containment bounds cached.
///
/// The extent is fixed at construction. [`HitArea::set_origin`] is the only
/// mutator and rewrites the origin together with every derived value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitArea {
    shape: Shape,
    origin: Vector2,
    derived: Derived,
}

impl HitArea {
    /// Creates a circular hit area.
    pub fn circle(radius: f32, origin: Vector2) -> Result<Self, ShapeError> {
        Self::new(Shape::Circle { radius }, origin)
    }

    /// Creates a square hit area.
    pub fn square(size: f32, origin: Vector2) -> Result<Self, ShapeError> {
        Self::new(Shape::Square { size }, origin)
    }

    /// Creates a hit area of the provided shape, rejecting degenerate extents.
    pub fn new(shape: Shape, origin: Vector2) -> Result<Self, ShapeError> {
        let extent = match shape {
            Shape::Circle { radius } => radius,
            Shape::Square { size } => size,
        };
        if !extent.is_finite() || extent <= 0.0 {
            return Err(ShapeError::Degenerate { extent });
        }

        Ok(Self {
            shape,
            origin,
            derived: derive(shape, origin),
        })
    }

    /// Moves the hit area, recomputing all cached bounds.
    pub fn set_origin(&mut self, origin: Vector2) {
        self.origin = origin;
        self.derived = derive(self.shape, origin);
    }

    /// Reports whether the point lies inside the shape, boundary included.
    #[must_use]
    pub fn contains_point(&self, point: Vector2) -> bool {
        match self.derived {
            Derived::Circle { radius_squared, .. } => {
                self.origin.distance_squared(point) <= radius_squared
            }
            Derived::Square { bounds } => bounds.contains(point),
        }
    }

    /// Shape and extent of the hit area.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Current anchor point.
    #[must_use]
    pub const fn origin(&self) -> Vector2 {
        self.origin
    }

    /// Radius for circles, `None` for squares.
    #[must_use]
    pub const fn radius(&self) -> Option<f32> {
        match self.shape {
            Shape::Circle { radius } => Some(radius),
            Shape::Square { .. } => None,
        }
    }

    /// Side length for squares, `None` for circles.
    #[must_use]
    pub const fn size(&self) -> Option<f32> {
        match self.shape {
            Shape::Square { size } => Some(size),
            Shape::Circle { .. } => None,
        }
    }

    /// Axis-aligned bounds enclosing the shape.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        match self.derived {
            Derived::Circle { radius, .. } => Rect::around(self.origin, radius),
            Derived::Square { bounds } => bounds,
        }
    }
}

fn derive(shape: Shape, origin: Vector2) -> Derived {
    match shape {
        Shape::Circle { radius } => Derived::Circle {
            radius,
            radius_squared: radius * radius,
        },
        Shape::Square { size } => Derived::Square {
            bounds: Rect::around(origin, size / 2.0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_boundary_is_inclusive() {
        let circle = HitArea::circle(5.0, Vector2::ZERO).expect("valid circle");
        assert!(circle.contains_point(Vector2::new(3.0, 4.0)));
        assert!(!circle.contains_point(Vector2::new(3.0, 4.0001)));
        assert!(circle.contains_point(Vector2::ZERO));
    }

    #[test]
    fn square_bounds_follow_size() {
        let square = HitArea::square(10.0, Vector2::ZERO).expect("valid square");
        assert_eq!(
            square.bounding_rect(),
            Rect {
                x1: -5.0,
                y1: -5.0,
                x2: 5.0,
                y2: 5.0,
            }
        );
        assert!(square.contains_point(Vector2::new(5.0, 5.0)));
        assert!(square.contains_point(Vector2::new(-5.0, -5.0)));
        assert!(!square.contains_point(Vector2::new(5.0001, 0.0)));
    }

    #[test]
    fn set_origin_moves_every_derived_bound() {
        let mut square = HitArea::square(2.0, Vector2::ZERO).expect("valid square");
        square.set_origin(Vector2::new(10.0, 20.0));

        assert_eq!(square.origin(), Vector2::new(10.0, 20.0));
        assert_eq!(
            square.bounding_rect(),
            Rect {
                x1: 9.0,
                y1: 19.0,
                x2: 11.0,
                y2: 21.0,
            }
        );
        assert!(!square.contains_point(Vector2::ZERO));
        assert!(square.contains_point(Vector2::new(11.0, 21.0)));

        let mut circle = HitArea::circle(1.0, Vector2::ZERO).expect("valid circle");
        circle.set_origin(Vector2::new(-3.0, 0.0));
        assert!(circle.contains_point(Vector2::new(-4.0, 0.0)));
        assert!(!circle.contains_point(Vector2::ZERO));
    }

    #[test]
    fn circle_bounding_rect_spans_radius() {
        let circle = HitArea::circle(2.0, Vector2::new(1.0, 1.0)).expect("valid circle");
        assert_eq!(
            circle.bounding_rect(),
            Rect {
                x1: -1.0,
                y1: -1.0,
                x2: 3.0,
                y2: 3.0,
            }
        );
        assert_eq!(circle.radius(), Some(2.0));
        assert_eq!(circle.size(), None);
    }

    #[test]
    fn degenerate_extents_are_rejected() {
        assert_eq!(
            HitArea::circle(0.0, Vector2::ZERO),
            Err(ShapeError::Degenerate { extent: 0.0 })
        );
        assert_eq!(
            HitArea::square(-1.0, Vector2::ZERO),
            Err(ShapeError::Degenerate { extent: -1.0 })
        );
        assert!(HitArea::circle(f32::INFINITY, Vector2::ZERO).is_err());
        assert!(HitArea::square(f32::NAN, Vector2::ZERO).is_err());
    }
}
