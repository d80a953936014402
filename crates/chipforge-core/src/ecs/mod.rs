//! ECS plumbing: components, resources and entity factories for chips and
//! background lattice elements.

pub mod components;
pub mod factories;
pub mod resources;
pub mod types;

pub use components::*;
pub use factories::*;
pub use resources::*;
pub use types::*;

use bevy_ecs::prelude::*;
use nalgebra::Point2;

use crate::chip::{
    BoundsQueryable, ChipAppearance, ChipDisplay, ChipInstanceData, Placeable, Serializable,
    TextMeasure,
};
use crate::display::DisplayOptions;
use crate::geometry::Bounds;

pub fn setup_editor_world(display_options: DisplayOptions) -> World {
    let mut world = World::new();

    // Initialize resources
    world.insert_resource(display_options);
    world.insert_resource(ChipSelection::default());
    world.insert_resource(HoveredChip::default());
    world.insert_resource(ChipIdAllocator::default());
    world.insert_resource(ChipTheme::default());

    world
}

pub fn chip_entities(world: &mut World) -> Vec<Entity> {
    let mut query = world.query_filtered::<Entity, With<ChipDisplay>>();
    query.iter(world).collect()
}

/// Topmost chip whose interaction bounds contain `point`
pub fn chip_at(world: &mut World, point: Point2<f32>) -> Option<Entity> {
    let mut query = world.query::<(Entity, &ChipDisplay, &ChipTransform)>();
    query
        .iter(world)
        .filter(|(_, chip, transform)| chip.bounds(transform).contains(point))
        .max_by(|(_, _, a), (_, _, b)| a.z.total_cmp(&b.z))
        .map(|(entity, _, _)| entity)
}

pub fn chip_bounds(world: &World, entity: Entity) -> Option<Bounds> {
    let chip = world.get::<ChipDisplay>(entity)?;
    let transform = world.get::<ChipTransform>(entity)?;
    Some(chip.bounds(transform))
}

pub fn chip_instance_data(world: &World, entity: Entity) -> Option<ChipInstanceData> {
    let chip = world.get::<ChipDisplay>(entity)?;
    let transform = world.get::<ChipTransform>(entity)?;
    Some(chip.instance_data(transform))
}

/// Snapshot of every chip, ordered by id
pub fn all_instance_data(world: &mut World) -> Vec<ChipInstanceData> {
    let mut query = world.query::<(&ChipDisplay, &ChipTransform)>();
    let mut data: Vec<ChipInstanceData> = query
        .iter(world)
        .map(|(chip, transform)| chip.instance_data(transform))
        .collect();
    data.sort_by_key(|instance| instance.id);
    data
}

pub fn set_highlight_state(world: &mut World, entity: Entity, highlighted: bool) {
    if let Some(mut chip) = world.get_mut::<ChipDisplay>(entity) {
        chip.set_highlight_state(highlighted);
    }
}

pub fn notify_moved(world: &mut World, entity: Entity) {
    if let Some(mut chip) = world.get_mut::<ChipDisplay>(entity) {
        chip.notify_moved();
    }
}

/// Despawn a chip and drop it from the selection
pub fn delete_chip(world: &mut World, entity: Entity) -> bool {
    if let Some(mut selection) = world.get_resource_mut::<ChipSelection>() {
        selection.0.retain(|e| *e != entity);
    }
    world.despawn(entity)
}

/// Recompute every chip footprint for a new grid step
pub fn relayout_chips(world: &mut World, discretization: f32, text: &dyn TextMeasure) {
    let theme = world.get_resource::<ChipTheme>().cloned().unwrap_or_default();
    let appearance = ChipAppearance {
        style: &theme.style,
        palette: &theme.palette,
        text,
    };
    let mut query = world.query::<&mut ChipDisplay>();
    for mut chip in query.iter_mut(world) {
        chip.relayout(discretization, &appearance);
    }
}
