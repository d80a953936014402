//! Display settings, the work area and the background grid visualizer.

pub mod grid;
pub mod options;
pub mod work_area;

pub use grid::{lattice_coordinates, lattice_count, lattice_indices, GridVisibilityState, GridVisualizer};
pub use options::*;
pub use work_area::WorkArea;
