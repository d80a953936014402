//! Chip descriptions, footprint layout and the chip display component.

pub mod colour;
pub mod description;
pub mod display;
pub mod layout;
pub mod text;

pub use colour::{Palette, PinColourTheme};
pub use description::*;
pub use display::*;
pub use layout::{compute_layout, format_name, ChipLayout, ChipStyle, PinPlacement};
pub use text::{MonospaceTextMeasure, TextMeasure};
