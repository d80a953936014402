use bevy_ecs::prelude::*;
use nalgebra::{Point2, Vector2};

/// World position of a chip centre plus its draw depth
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ChipTransform {
    pub position: Point2<f32>,
    pub z: f32,
}

impl ChipTransform {
    pub fn new(position: Point2<f32>, z: f32) -> Self {
        Self { position, z }
    }
}

/// One visual element of the background lattice
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum LatticeElement {
    Dot {
        position: Point2<f32>,
        /// Full width and height of the marker
        size: Vector2<f32>,
    },
    /// Spans the full width of the bounds
    HorizontalLine { y: f32, thickness: f32 },
    /// Spans the full height of the bounds
    VerticalLine { x: f32, thickness: f32 },
}

/// Regeneration a lattice element was spawned in
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeGeneration(pub u64);
