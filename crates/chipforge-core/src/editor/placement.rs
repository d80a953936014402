use bevy_ecs::prelude::*;
use nalgebra::Vector2;

use crate::chip::ChipDisplay;
use crate::ecs::{chip_bounds, ChipTransform};
use crate::geometry::{bounds_overlap_2d_allow_numerical_error, Bounds, DEFAULT_NUMERICAL_ERROR};

/// Decides whether a chip may stay where it was dropped
pub trait PlacementRules {
    /// `moving` holds every chip taken along by the same drag, `chip` included
    fn is_valid_placement(&self, world: &World, chip: Entity, moving: &[Entity]) -> bool;
}

/// Chips must stay inside the work area and must not overlap chips that are
/// not part of the same move.
#[derive(Debug, Clone, Copy)]
pub struct NonOverlappingPlacement {
    pub work_area: Bounds,
    pub allowed_numerical_error: f32,
}

impl NonOverlappingPlacement {
    pub fn new(work_area: Bounds) -> Self {
        Self {
            work_area,
            allowed_numerical_error: DEFAULT_NUMERICAL_ERROR,
        }
    }
}

impl PlacementRules for NonOverlappingPlacement {
    fn is_valid_placement(&self, world: &World, chip: Entity, moving: &[Entity]) -> bool {
        let Some(bounds) = chip_bounds(world, chip) else {
            return false;
        };

        let tolerance = Vector2::repeat(self.allowed_numerical_error);
        let allowed = Bounds::new(self.work_area.min - tolerance, self.work_area.max + tolerance);
        if !allowed.encloses(&bounds) {
            return false;
        }

        !world.iter_entities().any(|other| {
            let entity = other.id();
            if entity == chip || moving.contains(&entity) {
                return false;
            }
            match (other.get::<ChipDisplay>(), other.get::<ChipTransform>()) {
                (Some(_), Some(_)) => chip_bounds(world, entity).is_some_and(|other_bounds| {
                    bounds_overlap_2d_allow_numerical_error(
                        &bounds,
                        &other_bounds,
                        self.allowed_numerical_error,
                    )
                }),
                _ => false,
            }
        })
    }
}
