//! Drag controller for selected chips.
//!
//! A press on a chip arms the mover. The drag starts once the mouse has
//! travelled more than [`DRAG_THRESHOLD`] from the press position; at that
//! point the selection is read and every start position is recorded.
//! A single chip snaps by its top-left corner, several chips snap the mouse
//! delta and share it exactly.

use bevy_ecs::prelude::*;
use log::{debug, info, warn};
use nalgebra::{Point2, Vector2};

use super::observer::{SubscriptionId, Subscribers};
use super::placement::PlacementRules;
use crate::ecs::{chip_bounds, notify_moved, ChipSelection, ChipTransform, RenderOrder};
use crate::geometry::discretize_vector;
use crate::navigation::InputSnapshot;

/// Mouse travel (world units) that turns a press into a drag
pub const DRAG_THRESHOLD: f32 = 0.0001;

/// Called with the chips of the current drag after each movement cycle
pub type ChipsMovedCallback = dyn FnMut(&mut World, &[Entity]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoverState {
    Idle,
    /// Pressed on a chip, mouse not yet past the threshold
    Armed,
    Dragging,
}

pub struct ChipMover {
    state: MoverState,
    drag_start: Point2<f32>,
    chips_to_move: Vec<Entity>,
    start_positions: Vec<Point2<f32>>,
    chips_moved: Subscribers<ChipsMovedCallback>,
}

impl Default for ChipMover {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipMover {
    pub fn new() -> Self {
        Self {
            state: MoverState::Idle,
            drag_start: Point2::origin(),
            chips_to_move: Vec::new(),
            start_positions: Vec::new(),
            chips_moved: Subscribers::default(),
        }
    }

    pub fn state(&self) -> MoverState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == MoverState::Dragging
    }

    pub fn moving_chips(&self) -> &[Entity] {
        &self.chips_to_move
    }

    pub fn subscribe_chips_moved(&mut self, callback: Box<ChipsMovedCallback>) -> SubscriptionId {
        self.chips_moved.subscribe(callback)
    }

    pub fn unsubscribe_chips_moved(&mut self, id: SubscriptionId) -> bool {
        self.chips_moved.unsubscribe(id)
    }

    /// A chip received a left press at `mouse_world`
    pub fn on_chip_pressed(&mut self, mouse_world: Point2<f32>, can_edit: bool) {
        if can_edit && self.state != MoverState::Dragging {
            self.state = MoverState::Armed;
            self.drag_start = mouse_world;
        }
    }

    /// Run one frame of the drag state machine
    pub fn tick(
        &mut self,
        world: &mut World,
        input: &InputSnapshot,
        grid_snap: bool,
        discretization: f32,
        rules: &dyn PlacementRules,
    ) {
        if self.state == MoverState::Dragging {
            if let Some(gone) = self.first_despawned(world) {
                warn!("Chip {:?} was removed while being moved, ending drag", gone);
                self.stop_moving(world);
            }
        }

        let mouse_delta = input.mouse_world - self.drag_start;
        if mouse_delta.norm() > DRAG_THRESHOLD {
            if self.state == MoverState::Armed {
                self.init_chips_to_move(world);
            }
            if self.state == MoverState::Dragging {
                self.apply_delta(world, mouse_delta, grid_snap, discretization);
                self.emit_chips_moved(world);
            }
        }

        if input.left_released {
            match self.state {
                MoverState::Armed => self.state = MoverState::Idle,
                MoverState::Dragging => {
                    if self.is_valid_position(world, rules) {
                        info!("Placed {} moved chip(s)", self.chips_to_move.len());
                        self.stop_moving(world);
                    } else {
                        info!("Invalid placement, returning {} chip(s)", self.chips_to_move.len());
                        self.cancel(world);
                    }
                }
                MoverState::Idle => {}
            }
        }

        if input.right_pressed || input.escape_pressed {
            self.cancel(world);
        }
    }

    /// Put every moved chip back at its exact start position
    pub fn cancel(&mut self, world: &mut World) {
        match self.state {
            MoverState::Dragging => {
                for (entity, start) in self.chips_to_move.iter().zip(&self.start_positions) {
                    if let Some(mut transform) = world.get_mut::<ChipTransform>(*entity) {
                        transform.position = *start;
                    }
                }
                info!("Move of {} chip(s) cancelled", self.chips_to_move.len());
                self.emit_chips_moved(world);
                self.stop_moving(world);
            }
            MoverState::Armed => self.state = MoverState::Idle,
            MoverState::Idle => {}
        }
    }

    /// Hook for chip removal; ends the drag if the chip was being moved
    pub fn on_chip_deleted(&mut self, world: &mut World, chip: Entity) {
        if self.state == MoverState::Dragging && self.chips_to_move.contains(&chip) {
            warn!("Chip {:?} deleted while being moved, ending drag", chip);
            self.stop_moving(world);
        }
    }

    fn init_chips_to_move(&mut self, world: &World) {
        let selection = world
            .get_resource::<ChipSelection>()
            .map(|selection| selection.0.clone())
            .unwrap_or_default();

        self.chips_to_move.clear();
        self.start_positions.clear();
        for entity in selection {
            if let Some(transform) = world.get::<ChipTransform>(entity) {
                self.chips_to_move.push(entity);
                self.start_positions.push(transform.position);
            }
        }

        if self.chips_to_move.is_empty() {
            debug!("Drag started with an empty selection, ignoring");
            self.state = MoverState::Idle;
        } else {
            debug!("Dragging {} chip(s)", self.chips_to_move.len());
            self.state = MoverState::Dragging;
        }
    }

    fn apply_delta(
        &self,
        world: &mut World,
        mouse_delta: Vector2<f32>,
        grid_snap: bool,
        discretization: f32,
    ) {
        if let ([chip], [start]) = (self.chips_to_move.as_slice(), self.start_positions.as_slice()) {
            let mut target = start + mouse_delta;
            if grid_snap {
                if let Some(bounds) = chip_bounds(world, *chip) {
                    let extents = bounds.extents();
                    let top_left_offset = Vector2::new(-extents.x, extents.y);
                    let top_left = discretize_vector(target.coords + top_left_offset, discretization, None);
                    target = Point2::from(top_left - top_left_offset);
                }
            }
            set_moving_position(world, *chip, target);
        } else {
            let delta = if grid_snap {
                discretize_vector(mouse_delta, discretization, None)
            } else {
                mouse_delta
            };
            for (entity, start) in self.chips_to_move.iter().zip(&self.start_positions) {
                set_moving_position(world, *entity, start + delta);
            }
        }
    }

    fn emit_chips_moved(&mut self, world: &mut World) {
        for entity in &self.chips_to_move {
            notify_moved(world, *entity);
        }
        let chips = &self.chips_to_move;
        for callback in self.chips_moved.iter_mut() {
            callback(world, chips);
        }
    }

    fn is_valid_position(&self, world: &World, rules: &dyn PlacementRules) -> bool {
        !self.chips_to_move.is_empty()
            && self
                .chips_to_move
                .iter()
                .all(|chip| rules.is_valid_placement(world, *chip, &self.chips_to_move))
    }

    /// Leave chips where they are, back on the resting render order
    fn stop_moving(&mut self, world: &mut World) {
        if self.state != MoverState::Dragging {
            return;
        }
        for entity in &self.chips_to_move {
            if let Some(mut transform) = world.get_mut::<ChipTransform>(*entity) {
                transform.z = RenderOrder::CHIP;
            }
        }
        self.chips_to_move.clear();
        self.start_positions.clear();
        self.state = MoverState::Idle;
    }

    fn first_despawned(&self, world: &World) -> Option<Entity> {
        self.chips_to_move
            .iter()
            .copied()
            .find(|entity| world.get::<ChipTransform>(*entity).is_none())
    }
}

fn set_moving_position(world: &mut World, entity: Entity, position: Point2<f32>) {
    if let Some(mut transform) = world.get_mut::<ChipTransform>(entity) {
        transform.position = position;
        transform.z = RenderOrder::CHIP_MOVING;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{ChipDescription, ChipInstanceData, MonospaceTextMeasure, Point};
    use crate::display::DisplayOptions;
    use crate::ecs::{load_chip, setup_editor_world};
    use crate::editor::NonOverlappingPlacement;
    use crate::geometry::Bounds;

    fn spawn_at(world: &mut World, x: f32, y: f32) -> Entity {
        let description = ChipDescription {
            name: "NAND".to_string(),
            colour: "#AA3322".to_string(),
            input_pins: Vec::new(),
            output_pins: Vec::new(),
        };
        let instance = ChipInstanceData {
            name: "NAND".to_string(),
            id: 0,
            points: vec![Point::new(x, y)],
        };
        load_chip(world, &description, &instance, 0.25, &MonospaceTextMeasure::default())
    }

    fn rules() -> NonOverlappingPlacement {
        NonOverlappingPlacement::new(Bounds::new(Point2::new(-10.0, -10.0), Point2::new(10.0, 10.0)))
    }

    fn drag_to(mover: &mut ChipMover, world: &mut World, x: f32, y: f32) {
        mover.tick(world, &InputSnapshot::at(Point2::new(x, y)), false, 0.25, &rules());
    }

    #[test]
    fn test_press_without_movement_stays_armed() {
        let mut world = setup_editor_world(DisplayOptions::default());
        let chip = spawn_at(&mut world, 0.0, 0.0);
        world.resource_mut::<ChipSelection>().select_only(chip);

        let mut mover = ChipMover::new();
        mover.on_chip_pressed(Point2::new(0.0, 0.0), true);
        drag_to(&mut mover, &mut world, 0.00005, 0.0);
        assert_eq!(mover.state(), MoverState::Armed);

        let release = InputSnapshot {
            left_released: true,
            ..InputSnapshot::at(Point2::new(0.00005, 0.0))
        };
        mover.tick(&mut world, &release, false, 0.25, &rules());
        assert_eq!(mover.state(), MoverState::Idle);
        assert_eq!(world.get::<ChipTransform>(chip).unwrap().position, Point2::origin());
    }

    #[test]
    fn test_press_ignored_when_not_editable() {
        let mut mover = ChipMover::new();
        mover.on_chip_pressed(Point2::new(1.0, 1.0), false);
        assert_eq!(mover.state(), MoverState::Idle);
    }

    #[test]
    fn test_drag_and_commit() {
        let mut world = setup_editor_world(DisplayOptions::default());
        let chip = spawn_at(&mut world, 0.0, 0.0);
        world.resource_mut::<ChipSelection>().select_only(chip);

        let mut mover = ChipMover::new();
        mover.on_chip_pressed(Point2::new(0.0, 0.0), true);
        drag_to(&mut mover, &mut world, 2.0, 1.0);
        assert!(mover.is_busy());
        let transform = world.get::<ChipTransform>(chip).unwrap();
        assert_eq!(transform.position, Point2::new(2.0, 1.0));
        assert_eq!(transform.z, RenderOrder::CHIP_MOVING);

        let release = InputSnapshot {
            left_released: true,
            ..InputSnapshot::at(Point2::new(2.0, 1.0))
        };
        mover.tick(&mut world, &release, false, 0.25, &rules());
        assert_eq!(mover.state(), MoverState::Idle);
        let transform = world.get::<ChipTransform>(chip).unwrap();
        assert_eq!(transform.position, Point2::new(2.0, 1.0));
        assert_eq!(transform.z, RenderOrder::CHIP);
    }

    #[test]
    fn test_invalid_drop_returns_chip() {
        let mut world = setup_editor_world(DisplayOptions::default());
        let chip = spawn_at(&mut world, 0.0, 0.0);
        spawn_at(&mut world, 3.0, 0.0);
        world.resource_mut::<ChipSelection>().select_only(chip);

        let mut mover = ChipMover::new();
        mover.on_chip_pressed(Point2::new(0.0, 0.0), true);
        drag_to(&mut mover, &mut world, 3.1, 0.0);
        let release = InputSnapshot {
            left_released: true,
            ..InputSnapshot::at(Point2::new(3.1, 0.0))
        };
        mover.tick(&mut world, &release, false, 0.25, &rules());

        assert_eq!(mover.state(), MoverState::Idle);
        assert_eq!(world.get::<ChipTransform>(chip).unwrap().position, Point2::origin());
    }

    #[test]
    fn test_escape_cancels_and_notifies() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut world = setup_editor_world(DisplayOptions::default());
        let chip = spawn_at(&mut world, 0.5, 0.5);
        world.resource_mut::<ChipSelection>().select_only(chip);

        let mut mover = ChipMover::new();
        let notifications = Rc::new(Cell::new(0));
        let seen = notifications.clone();
        mover.subscribe_chips_moved(Box::new(move |_: &mut World, chips: &[Entity]| {
            assert_eq!(chips.len(), 1);
            seen.set(seen.get() + 1);
        }));

        mover.on_chip_pressed(Point2::new(0.5, 0.5), true);
        drag_to(&mut mover, &mut world, 1.5, 0.5);
        let escape = InputSnapshot {
            escape_pressed: true,
            ..InputSnapshot::at(Point2::new(1.5, 0.5))
        };
        mover.tick(&mut world, &escape, false, 0.25, &rules());

        assert_eq!(world.get::<ChipTransform>(chip).unwrap().position, Point2::new(0.5, 0.5));
        // Two movement cycles (the second re-applies the same delta) plus the cancel
        assert_eq!(notifications.get(), 3);
        assert_eq!(mover.state(), MoverState::Idle);
    }

    #[test]
    fn test_deleted_chip_ends_drag() {
        let mut world = setup_editor_world(DisplayOptions::default());
        let doomed = spawn_at(&mut world, 0.0, 0.0);
        let survivor = spawn_at(&mut world, 2.0, 0.0);
        world.resource_mut::<ChipSelection>().0 = vec![doomed, survivor];

        let mut mover = ChipMover::new();
        mover.on_chip_pressed(Point2::new(0.0, 0.0), true);
        drag_to(&mut mover, &mut world, 0.0, 1.0);
        assert!(mover.is_busy());

        mover.on_chip_deleted(&mut world, doomed);
        world.despawn(doomed);
        assert_eq!(mover.state(), MoverState::Idle);
        let transform = world.get::<ChipTransform>(survivor).unwrap();
        assert_eq!(transform.position, Point2::new(2.0, 1.0));
        assert_eq!(transform.z, RenderOrder::CHIP);
    }
}
