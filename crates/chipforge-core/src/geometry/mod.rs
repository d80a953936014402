//! Plane geometry shared by the layout engine, the grid and the chip mover.

pub mod discretize;

pub use discretize::*;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point2<f32>,
    pub max: Point2<f32>,
}

impl Bounds {
    pub fn new(min: Point2<f32>, max: Point2<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Point2<f32>, size: Vector2<f32>) -> Self {
        let extents = size / 2.0;
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    pub fn size(&self) -> Vector2<f32> {
        self.max - self.min
    }

    /// Half of the size along each axis
    pub fn extents(&self) -> Vector2<f32> {
        self.size() / 2.0
    }

    pub fn center(&self) -> Point2<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, point: Point2<f32>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// True when `other` lies entirely inside these bounds (edges may touch)
    pub fn encloses(&self, other: &Bounds) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// Zero width or zero height
    pub fn is_degenerate(&self) -> bool {
        self.width() * self.height() == 0.0
    }
}

/// Intersection of the infinite lines through `a1-a2` and `b1-b2`.
///
/// Returns `None` for parallel lines.
pub fn line_intersects_line(
    a1: Point2<f32>,
    a2: Point2<f32>,
    b1: Point2<f32>,
    b2: Point2<f32>,
) -> Option<Point2<f32>> {
    let d = (a1.x - a2.x) * (b1.y - b2.y) - (a1.y - a2.y) * (b1.x - b2.x);
    if d == 0.0 {
        return None;
    }

    let n = (a1.x - b1.x) * (b1.y - b2.y) - (a1.y - b1.y) * (b1.x - b2.x);
    let t = n / d;
    Some(a1 + (a2 - a1) * t)
}

/// Strict overlap test. Degenerate rectangles never overlap anything.
pub fn bounds_overlap_2d(a: &Bounds, b: &Bounds) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    let overlap_x = b.min.x < a.max.x && b.max.x > a.min.x;
    let overlap_y = b.min.y < a.max.y && b.max.y > a.min.y;
    overlap_x && overlap_y
}

/// Default tolerance used by [`bounds_overlap_2d_allow_numerical_error`]
pub const DEFAULT_NUMERICAL_ERROR: f32 = 0.001;

/// Overlap test that ignores shared edges and slivers thinner than
/// `allowed_numerical_error` along either axis.
pub fn bounds_overlap_2d_allow_numerical_error(
    a: &Bounds,
    b: &Bounds,
    allowed_numerical_error: f32,
) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    let overlap_x =
        two_ranges_intersection_span(a.min.x, a.max.x, b.min.x, b.max.x) > allowed_numerical_error;
    let overlap_y =
        two_ranges_intersection_span(a.min.y, a.max.y, b.min.y, b.max.y) > allowed_numerical_error;
    overlap_x && overlap_y
}

/// Length of the intersection of `[a_min, a_max]` and `[b_min, b_max]`.
///
/// Negative when the ranges are apart (the value is then minus the gap).
pub fn two_ranges_intersection_span(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> f32 {
    let container_min = a_min.min(b_min);
    let container_max = a_max.max(b_max);
    let container_length = container_max - container_min;
    let a_length = a_max - a_min;
    let b_length = b_max - b_min;
    a_length + b_length - container_length
}
