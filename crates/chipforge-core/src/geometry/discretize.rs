//! Grid discretization: snapping continuous coordinates onto an
//! origin-anchored lattice.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use super::Bounds;
use crate::{ChipForgeError, Result};

/// Lattice step plus the region the lattice covers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    discretization: f32,
    bounds: Bounds,
}

impl GridSpec {
    pub fn new(discretization: f32, bounds: Bounds) -> Result<Self> {
        if !(discretization.is_finite() && discretization > 0.0) {
            return Err(ChipForgeError::InvalidGrid(format!(
                "discretization must be positive, got {discretization}"
            )));
        }
        if bounds.max.x < bounds.min.x || bounds.max.y < bounds.min.y {
            return Err(ChipForgeError::InvalidGrid(format!(
                "bounds max {:?} is below min {:?}",
                bounds.max, bounds.min
            )));
        }
        Ok(Self { discretization, bounds })
    }

    pub fn discretization(&self) -> f32 {
        self.discretization
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Snap a point to the nearest lattice point inside the bounds
    pub fn snap(&self, point: Point2<f32>) -> Point2<f32> {
        discretize_vector(point.coords, self.discretization, Some(&self.bounds)).into()
    }
}

/// Snap `value` to a multiple of `discretization`.
///
/// The value is first clamped into the given boundaries. Of the two
/// neighbouring lattice values the nearer one wins and an exact tie goes to
/// the higher one. When the winner lies outside a boundary the other
/// neighbour is returned instead.
pub fn discretize(
    value: f32,
    discretization: f32,
    lower_boundary: Option<f32>,
    higher_boundary: Option<f32>,
) -> f32 {
    let mut value = value;
    if let Some(high) = higher_boundary {
        if value > high {
            value = high;
        }
    }
    if let Some(low) = lower_boundary {
        if value < low {
            value = low;
        }
    }

    let steps = (value / discretization).floor();
    let adjacent_lower = discretization * steps;
    let adjacent_higher = adjacent_lower + discretization;
    let distance_down = value - adjacent_lower;
    let distance_up = adjacent_higher - value;

    if distance_down < distance_up {
        match lower_boundary {
            Some(low) if adjacent_lower < low => adjacent_higher,
            _ => adjacent_lower,
        }
    } else {
        match higher_boundary {
            Some(high) if adjacent_higher > high => adjacent_lower,
            _ => adjacent_higher,
        }
    }
}

/// Round `value` up to the next lattice value (lattice values map to themselves)
pub fn discretize_up(value: f32, discretization: f32) -> f32 {
    discretize(value, discretization, Some(value), None)
}

/// Per-axis [`discretize`] with optional absolute bounds
pub fn discretize_vector(
    position: Vector2<f32>,
    discretization: f32,
    bounds: Option<&Bounds>,
) -> Vector2<f32> {
    let x = discretize(
        position.x,
        discretization,
        bounds.map(|b| b.min.x),
        bounds.map(|b| b.max.x),
    );
    let y = discretize(
        position.y,
        discretization,
        bounds.map(|b| b.min.y),
        bounds.map(|b| b.max.y),
    );
    Vector2::new(x, y)
}

/// Snap in a frame shifted by `offset`, then shift back
pub fn discretize_vector_with_offset(
    position: Vector2<f32>,
    discretization: f32,
    offset: Vector2<f32>,
    bounds: Option<&Bounds>,
) -> Vector2<f32> {
    discretize_vector(position + offset, discretization, bounds) - offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_exact_tie_goes_to_higher() {
        assert_eq!(discretize(5.0, 10.0, Some(0.0), Some(100.0)), 10.0);
        assert_eq!(discretize(5.0, 10.0, None, None), 10.0);
        assert_eq!(discretize(-5.0, 10.0, None, None), 0.0);
        assert_eq!(discretize(0.5, 1.0, None, None), 1.0);
    }

    #[test]
    fn test_nearest_neighbour() {
        assert_eq!(discretize(4.9, 10.0, None, None), 0.0);
        assert_eq!(discretize(5.1, 10.0, None, None), 10.0);
        assert_eq!(discretize(-4.0, 10.0, None, None), 0.0);
        assert_eq!(discretize(-6.0, 10.0, None, None), -10.0);
        assert_eq!(discretize(30.0, 10.0, None, None), 30.0);
    }

    #[test]
    fn test_result_within_half_step() {
        let step = 0.25;
        let mut v = -3.0_f32;
        while v < 3.0 {
            let snapped = discretize(v, step, None, None);
            assert!((snapped - v).abs() <= step / 2.0 + 1e-5, "{v} -> {snapped}");
            let ratio = snapped / step;
            assert_abs_diff_eq!(ratio, ratio.round(), epsilon = 1e-3);
            v += 0.013;
        }
    }

    #[test]
    fn test_value_is_clamped_before_snapping() {
        assert_eq!(discretize(250.0, 10.0, Some(0.0), Some(100.0)), 100.0);
        assert_eq!(discretize(-40.0, 10.0, Some(0.0), Some(100.0)), 0.0);
    }

    #[test]
    fn test_neighbour_outside_boundary_is_rejected() {
        // Nearest is 0 but the lower boundary is 2
        assert_eq!(discretize(2.0, 10.0, Some(2.0), Some(100.0)), 10.0);
        // Nearest is 100 but the upper boundary is 97
        assert_eq!(discretize(97.0, 10.0, Some(0.0), Some(97.0)), 90.0);
    }

    #[test]
    fn test_never_leaves_bounds_when_lattice_point_exists() {
        let (low, high) = (1.3_f32, 8.7_f32);
        let mut v = -5.0_f32;
        while v < 15.0 {
            let snapped = discretize(v, 1.0, Some(low), Some(high));
            assert!(snapped >= low && snapped <= high, "{v} -> {snapped}");
            v += 0.05;
        }
    }

    #[test]
    fn test_discretize_up() {
        assert_abs_diff_eq!(discretize_up(1.1, 1.0), 2.0);
        assert_abs_diff_eq!(discretize_up(0.9, 1.0), 1.0);
        assert_abs_diff_eq!(discretize_up(2.0, 1.0), 2.0);
        assert_abs_diff_eq!(discretize_up(0.26, 0.25), 0.5);
    }

    #[test]
    fn test_vector_with_offset() {
        let offset = Vector2::new(0.3, -0.2);
        let snapped = discretize_vector_with_offset(Vector2::new(1.0, 1.0), 1.0, offset, None);
        // 1.3 -> 1.0 and 0.8 -> 1.0, then shifted back
        assert_abs_diff_eq!(snapped.x, 0.7, epsilon = 1e-6);
        assert_abs_diff_eq!(snapped.y, 1.2, epsilon = 1e-6);
    }

    #[test]
    fn test_grid_spec_validation() {
        let bounds = Bounds::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        assert!(GridSpec::new(0.5, bounds).is_ok());
        assert!(GridSpec::new(0.0, bounds).is_err());
        assert!(GridSpec::new(-1.0, bounds).is_err());
        assert!(GridSpec::new(f32::NAN, bounds).is_err());

        let inverted = Bounds::new(Point2::new(1.0, 0.0), Point2::new(0.0, 10.0));
        assert!(matches!(
            GridSpec::new(1.0, inverted),
            Err(ChipForgeError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_grid_spec_snap_respects_bounds() {
        let bounds = Bounds::new(Point2::new(0.0, 0.0), Point2::new(4.0, 4.0));
        let grid = GridSpec::new(1.0, bounds).unwrap();
        assert_eq!(grid.snap(Point2::new(1.4, 2.6)), Point2::new(1.0, 3.0));
        assert_eq!(grid.snap(Point2::new(-3.0, 9.0)), Point2::new(0.0, 4.0));
    }
}
