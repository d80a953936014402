use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// When pin names are drawn next to pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PinNameDisplayMode {
    Always,
    #[default]
    Hover,
    Toggle,
    Never,
}

impl PinNameDisplayMode {
    /// `hovered`: the mouse is over the pin's chip. `toggled`: the user's
    /// pin-name toggle is on.
    pub fn should_show(self, hovered: bool, toggled: bool) -> bool {
        match self {
            PinNameDisplayMode::Always => true,
            PinNameDisplayMode::Hover => hovered,
            PinNameDisplayMode::Toggle => toggled,
            PinNameDisplayMode::Never => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToggleState {
    #[default]
    Off,
    On,
}

impl ToggleState {
    pub fn is_on(self) -> bool {
        self == ToggleState::On
    }
}

/// When the background grid is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridDisplayMode {
    Always,
    /// Only while the grid-snap modifier is held
    #[default]
    Sync,
    /// Flipped by the grid toggle key
    Toggle,
    Never,
}

/// Per-session display settings
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub main_chip_pin_name_mode: PinNameDisplayMode,
    pub sub_chip_pin_name_mode: PinNameDisplayMode,
    pub show_cursor_guide: ToggleState,
    pub grid_display_mode: GridDisplayMode,
}
