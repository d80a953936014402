//! # chipforge-core
//!
//! Grid discretization, chip layout geometry and editor controllers for the
//! ChipForge logic-chip editor.
//!
//! Chips and background-grid elements live as entities in a `bevy_ecs`
//! [`World`](bevy_ecs::world::World). Controllers are ticked once per frame
//! with an [`InputSnapshot`](navigation::InputSnapshot) sampled before any
//! mutation happens.

pub mod chip;
pub mod display;
pub mod ecs;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod navigation;
pub mod project;

// Re-exports for easy access
pub use error::{ChipForgeError, Result};
pub use geometry::{Bounds, GridSpec};
