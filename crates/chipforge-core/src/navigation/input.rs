use egui::{InputState, Key};
use nalgebra::Point2;

use super::mouse::ViewTransform;

/// Everything controllers read from the input devices during one tick.
///
/// Sampled once at the start of the frame, before any controller mutates
/// the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    pub mouse_world: Point2<f32>,
    pub left_pressed: bool,
    pub left_down: bool,
    pub left_released: bool,
    pub right_pressed: bool,
    pub escape_pressed: bool,
    /// Grid-snap modifier (Ctrl)
    pub grid_snap_held: bool,
    /// Multi-select modifier (Shift)
    pub multi_select_held: bool,
    /// Grid toggle key (G)
    pub toggle_grid_pressed: bool,
    /// Pin name toggle key (P)
    pub toggle_pin_names_pressed: bool,
    pub delete_pressed: bool,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            mouse_world: Point2::origin(),
            left_pressed: false,
            left_down: false,
            left_released: false,
            right_pressed: false,
            escape_pressed: false,
            grid_snap_held: false,
            multi_select_held: false,
            toggle_grid_pressed: false,
            toggle_pin_names_pressed: false,
            delete_pressed: false,
        }
    }
}

impl InputSnapshot {
    /// Snapshot at `mouse_world` with no buttons or keys active
    pub fn at(mouse_world: Point2<f32>) -> Self {
        Self {
            mouse_world,
            ..Default::default()
        }
    }

    pub fn from_egui(input: &InputState, view: &ViewTransform) -> Self {
        let mouse_world = input
            .pointer
            .latest_pos()
            .map(|pos| view.screen_to_world(pos))
            .unwrap_or_else(Point2::origin);

        Self {
            mouse_world,
            left_pressed: input.pointer.primary_pressed(),
            left_down: input.pointer.primary_down(),
            left_released: input.pointer.primary_released(),
            right_pressed: input.pointer.secondary_pressed(),
            escape_pressed: input.key_pressed(Key::Escape),
            grid_snap_held: input.modifiers.ctrl,
            multi_select_held: input.modifiers.shift,
            toggle_grid_pressed: input.key_pressed(Key::G),
            toggle_pin_names_pressed: input.key_pressed(Key::P),
            delete_pressed: input.key_pressed(Key::Delete),
        }
    }
}
