//! Screen/world conversion and per-frame input sampling for the editor.

pub mod input;
pub mod mouse;

pub use input::InputSnapshot;
pub use mouse::*;
