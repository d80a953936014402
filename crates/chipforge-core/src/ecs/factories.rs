//! Entity factories: each function is the full recipe for one kind of entity.

use bevy_ecs::prelude::*;
use nalgebra::Point2;

use super::{ChipIdAllocator, ChipTheme, ChipTransform, LatticeElement, LatticeGeneration, RenderOrder};
use crate::chip::{ChipAppearance, ChipDescription, ChipDisplay, ChipInstanceData, TextMeasure};
use crate::Result;

fn build_chip(
    world: &World,
    description: &ChipDescription,
    id: i32,
    discretization: f32,
    text: &dyn TextMeasure,
) -> ChipDisplay {
    let theme = world.get_resource::<ChipTheme>().cloned().unwrap_or_default();
    let appearance = ChipAppearance {
        style: &theme.style,
        palette: &theme.palette,
        text,
    };
    ChipDisplay::new(description, id, discretization, &appearance)
}

/// Spawn a chip restored from persisted instance data.
///
/// The chip is centred on the first stored point, or the origin when the
/// instance has none.
pub fn load_chip(
    world: &mut World,
    description: &ChipDescription,
    instance: &ChipInstanceData,
    discretization: f32,
    text: &dyn TextMeasure,
) -> Entity {
    let chip = build_chip(world, description, instance.id, discretization, text);
    let position = instance
        .points
        .first()
        .map(|point| Point2::new(point.x, point.y))
        .unwrap_or_else(Point2::origin);

    if let Some(mut ids) = world.get_resource_mut::<ChipIdAllocator>() {
        ids.reserve(instance.id);
    }
    world
        .spawn((chip, ChipTransform::new(position, RenderOrder::CHIP)))
        .id()
}

/// Spawn a brand new chip at the origin, ready to be dragged into place
pub fn start_placing_chip(
    world: &mut World,
    description: &ChipDescription,
    discretization: f32,
    text: &dyn TextMeasure,
) -> Result<Entity> {
    let id = match world.get_resource_mut::<ChipIdAllocator>() {
        Some(mut ids) => ids.allocate()?,
        None => 0,
    };
    let chip = build_chip(world, description, id, discretization, text);
    Ok(world
        .spawn((chip, ChipTransform::new(Point2::origin(), RenderOrder::CHIP_MOVING)))
        .id())
}

pub fn spawn_lattice_element(world: &mut World, element: LatticeElement, generation: u64) -> Entity {
    world.spawn((element, LatticeGeneration(generation))).id()
}
