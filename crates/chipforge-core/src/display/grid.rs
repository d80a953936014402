//! Background lattice visualizer.
//!
//! Elements are plain entities tagged with the generation they were spawned
//! in. Every resize of the work area despawns the previous generation and
//! spawns a fresh one before `resize` returns.

use std::ops::RangeInclusive;

use bevy_ecs::prelude::*;
use log::{debug, warn};
use nalgebra::{Point2, Vector2};

use super::options::{DisplayOptions, GridDisplayMode};
use super::work_area::WorkArea;
use crate::ecs::{spawn_lattice_element, GridStyle, LatticeElement, LatticeGeneration};
use crate::editor::SubscriptionId;
use crate::geometry::{Bounds, GridSpec};

/// Tolerance, in steps, for bounds that sit on a lattice line
const LATTICE_EPSILON: f32 = 1e-4;
/// Regeneration is skipped above this many elements
pub const MAX_LATTICE_ELEMENTS: usize = 100_000;
pub const DEFAULT_GRID_THICKNESS: f32 = 0.0015;

/// Origin-anchored lattice indices in `[min, max]`; index `i` sits at `i * step`
pub fn lattice_indices(min: f32, max: f32, step: f32) -> RangeInclusive<i64> {
    if !(step > 0.0) || !(max >= min) || !min.is_finite() || !max.is_finite() {
        return 1..=0;
    }
    // `as` saturates, so absurd steps clamp to the i64 range instead of wrapping
    let first = (min / step - LATTICE_EPSILON).ceil() as i64;
    let last = (max / step + LATTICE_EPSILON).floor() as i64;
    first..=last
}

/// Number of indices in `indices`, saturating at `usize::MAX`
pub fn lattice_count(indices: &RangeInclusive<i64>) -> usize {
    if indices.is_empty() {
        return 0;
    }
    indices
        .end()
        .checked_sub(*indices.start())
        .and_then(|span| usize::try_from(span).ok())
        .and_then(|span| span.checked_add(1))
        .unwrap_or(usize::MAX)
}

/// Origin-anchored lattice coordinates in `[min, max]`
pub fn lattice_coordinates(min: f32, max: f32, step: f32) -> impl Iterator<Item = f32> {
    lattice_indices(min, max, step).map(move |index| index as f32 * step)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridVisibilityState {
    Hidden,
    VisibleAlways,
    /// Shown while the grid-snap modifier is held
    VisibleSynced,
    /// Shown after an odd number of toggle presses
    VisibleToggled,
}

#[derive(Resource, Debug)]
pub struct GridVisualizer {
    mode: GridDisplayMode,
    visible: bool,
    style: GridStyle,
    /// Relative to the bounds width
    thickness: f32,
    generation: u64,
    elements: Vec<Entity>,
    subscription: Option<SubscriptionId>,
}

impl GridVisualizer {
    pub fn new(style: GridStyle, thickness: f32) -> Self {
        Self {
            mode: GridDisplayMode::Never,
            visible: false,
            style,
            thickness,
            generation: 0,
            elements: Vec::new(),
            subscription: None,
        }
    }

    /// Insert the visualizer into `world`, hook it to the work area's resize
    /// notifications and spawn the first lattice.
    ///
    /// The display mode is read from the `DisplayOptions` resource.
    pub fn set_up(world: &mut World, work_area: &mut WorkArea, style: GridStyle, thickness: f32) {
        let mode = world
            .get_resource::<DisplayOptions>()
            .map(|options| options.grid_display_mode)
            .unwrap_or_default();

        let mut visualizer = Self::new(style, thickness);
        visualizer.set_grid_display_mode(mode);
        visualizer.subscription = Some(work_area.subscribe_resized(Box::new(regenerate_lattice)));
        visualizer.spawn_grid(world, work_area.spec());
        world.insert_resource(visualizer);
    }

    /// Undo `set_up`: unsubscribe, despawn the lattice, remove the resource
    pub fn tear_down(world: &mut World, work_area: &mut WorkArea) {
        let Some(mut visualizer) = world.remove_resource::<GridVisualizer>() else {
            return;
        };
        if let Some(id) = visualizer.subscription.take() {
            work_area.unsubscribe_resized(id);
        }
        visualizer.clear(world);
    }

    pub fn set_grid_display_mode(&mut self, mode: GridDisplayMode) {
        self.mode = mode;
        self.visible = mode == GridDisplayMode::Always;
    }

    pub fn mode(&self) -> GridDisplayMode {
        self.mode
    }

    /// Per-frame visibility update
    pub fn tick(&mut self, grid_snap_held: bool, toggle_pressed: bool) {
        match self.mode {
            GridDisplayMode::Sync => self.visible = grid_snap_held,
            GridDisplayMode::Toggle => {
                if toggle_pressed {
                    self.visible = !self.visible;
                }
            }
            GridDisplayMode::Always | GridDisplayMode::Never => {}
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> GridVisibilityState {
        match (self.mode, self.visible) {
            (GridDisplayMode::Always, true) => GridVisibilityState::VisibleAlways,
            (GridDisplayMode::Sync, true) => GridVisibilityState::VisibleSynced,
            (GridDisplayMode::Toggle, true) => GridVisibilityState::VisibleToggled,
            _ => GridVisibilityState::Hidden,
        }
    }

    pub fn style(&self) -> GridStyle {
        self.style
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn elements(&self) -> &[Entity] {
        &self.elements
    }

    /// Whether `entity` belongs to the current lattice
    pub fn is_current(&self, world: &World, entity: Entity) -> bool {
        world
            .get::<LatticeGeneration>(entity)
            .is_some_and(|generation| generation.0 == self.generation)
    }

    /// Vertical thickness in the bounds-normalised frame
    pub fn y_thickness(&self, bounds: &Bounds) -> f32 {
        if bounds.height() > 0.0 {
            self.thickness * bounds.width() / bounds.height()
        } else {
            self.thickness
        }
    }

    /// Replace the lattice with a fresh generation covering `spec`
    pub fn spawn_grid(&mut self, world: &mut World, spec: &GridSpec) {
        self.clear(world);
        self.generation += 1;

        let bounds = spec.bounds();
        let step = spec.discretization();
        let column_count = lattice_count(&lattice_indices(bounds.min.x, bounds.max.x, step));
        let row_count = lattice_count(&lattice_indices(bounds.min.y, bounds.max.y, step));

        // Counted before anything is allocated; `None` means past usize
        let count = match self.style {
            GridStyle::Dots => column_count.checked_mul(row_count),
            GridStyle::Lines => column_count.checked_add(row_count),
        };
        match count {
            Some(count) if count <= MAX_LATTICE_ELEMENTS => {}
            _ => {
                warn!(
                    "Grid step {} would need {} x {} lattice lines (limit {} elements), skipping",
                    step, column_count, row_count, MAX_LATTICE_ELEMENTS
                );
                return;
            }
        }

        let columns: Vec<f32> = lattice_coordinates(bounds.min.x, bounds.max.x, step).collect();
        let rows: Vec<f32> = lattice_coordinates(bounds.min.y, bounds.max.y, step).collect();

        // Square in world space
        let world_thickness = self.thickness * bounds.width();
        let elements = match self.style {
            GridStyle::Dots => {
                let size = Vector2::new(world_thickness * 2.0, world_thickness * 2.0);
                columns
                    .iter()
                    .flat_map(|x| {
                        rows.iter().map(move |y| LatticeElement::Dot {
                            position: Point2::new(*x, *y),
                            size,
                        })
                    })
                    .collect::<Vec<_>>()
            }
            GridStyle::Lines => rows
                .iter()
                .map(|y| LatticeElement::HorizontalLine { y: *y, thickness: world_thickness })
                .chain(
                    columns
                        .iter()
                        .map(|x| LatticeElement::VerticalLine { x: *x, thickness: world_thickness }),
                )
                .collect::<Vec<_>>(),
        };

        self.elements = elements
            .into_iter()
            .map(|element| spawn_lattice_element(world, element, self.generation))
            .collect();

        debug!(
            "Lattice generation {}: {} columns x {} rows, {} {:?} elements",
            self.generation,
            columns.len(),
            rows.len(),
            self.elements.len(),
            self.style
        );
    }

    fn clear(&mut self, world: &mut World) {
        for entity in self.elements.drain(..) {
            world.despawn(entity);
        }
    }
}

fn regenerate_lattice(world: &mut World, spec: &GridSpec) {
    if !world.contains_resource::<GridVisualizer>() {
        warn!("Work area resized without a grid visualizer in the world");
        return;
    }
    world.resource_scope(|world, mut visualizer: Mut<GridVisualizer>| {
        visualizer.spawn_grid(world, spec);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn spec(max_x: f32, max_y: f32, step: f32) -> GridSpec {
        GridSpec::new(step, Bounds::new(Point2::new(0.0, 0.0), Point2::new(max_x, max_y))).unwrap()
    }

    #[test]
    fn test_lattice_coordinates() {
        let coords = |min, max, step| lattice_coordinates(min, max, step).collect::<Vec<f32>>();
        assert_eq!(coords(0.0, 2.0, 0.5), vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(coords(-2.5, 2.5, 1.0), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(coords(0.3, 0.7, 1.0), Vec::<f32>::new());
        assert_eq!(coords(-1.0, 1.0, 0.1).len(), 21);
        assert!(coords(1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_lattice_count_without_materialising() {
        assert_eq!(lattice_count(&lattice_indices(0.0, 2.0, 0.5)), 5);
        assert_eq!(lattice_count(&lattice_indices(0.3, 0.7, 1.0)), 0);
        assert_eq!(lattice_count(&lattice_indices(1.0, 0.0, 1.0)), 0);
        assert_eq!(lattice_count(&lattice_indices(0.0, 1.0, 0.0)), 0);
        assert_eq!(lattice_count(&lattice_indices(0.0, f32::INFINITY, 1.0)), 0);

        let huge = lattice_count(&lattice_indices(0.0, 1000.0, 1e-9));
        assert!(huge > 900_000_000_000);
        assert_eq!(lattice_count(&lattice_indices(-1e30, 1e30, 1e-9)), usize::MAX);
    }

    #[test]
    fn test_display_mode_transitions() {
        let mut grid = GridVisualizer::new(GridStyle::Dots, DEFAULT_GRID_THICKNESS);
        assert_eq!(grid.state(), GridVisibilityState::Hidden);

        grid.set_grid_display_mode(GridDisplayMode::Always);
        grid.tick(false, true);
        assert_eq!(grid.state(), GridVisibilityState::VisibleAlways);

        grid.set_grid_display_mode(GridDisplayMode::Sync);
        assert!(!grid.is_visible());
        grid.tick(true, false);
        assert_eq!(grid.state(), GridVisibilityState::VisibleSynced);
        grid.tick(false, false);
        assert_eq!(grid.state(), GridVisibilityState::Hidden);

        grid.set_grid_display_mode(GridDisplayMode::Toggle);
        grid.tick(false, true);
        assert_eq!(grid.state(), GridVisibilityState::VisibleToggled);
        grid.tick(true, false);
        assert!(grid.is_visible());
        grid.tick(false, true);
        assert_eq!(grid.state(), GridVisibilityState::Hidden);

        grid.set_grid_display_mode(GridDisplayMode::Never);
        grid.tick(true, true);
        assert_eq!(grid.state(), GridVisibilityState::Hidden);
    }

    #[test]
    fn test_y_thickness() {
        let grid = GridVisualizer::new(GridStyle::Dots, 0.01);
        let wide = Bounds::new(Point2::new(0.0, 0.0), Point2::new(4.0, 2.0));
        assert_abs_diff_eq!(grid.y_thickness(&wide), 0.02);
        let flat = Bounds::new(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        assert_abs_diff_eq!(grid.y_thickness(&flat), 0.01);
    }

    #[test]
    fn test_regeneration_replaces_previous_generation() {
        let mut world = World::new();
        let mut grid = GridVisualizer::new(GridStyle::Dots, DEFAULT_GRID_THICKNESS);

        grid.spawn_grid(&mut world, &spec(2.0, 1.0, 1.0));
        assert_eq!(grid.elements().len(), 3 * 2);
        let stale = grid.elements()[0];
        assert!(grid.is_current(&world, stale));

        grid.spawn_grid(&mut world, &spec(1.0, 1.0, 0.5));
        assert_eq!(grid.generation(), 2);
        assert_eq!(grid.elements().len(), 3 * 3);
        assert!(!grid.is_current(&world, stale));
        assert!(world.get_entity(stale).is_none());

        let mut query = world.query::<&LatticeElement>();
        assert_eq!(query.iter(&world).count(), 9);
    }

    #[test]
    fn test_line_style_counts() {
        let mut world = World::new();
        let mut grid = GridVisualizer::new(GridStyle::Lines, DEFAULT_GRID_THICKNESS);
        grid.spawn_grid(&mut world, &spec(10.0, 4.0, 1.0));

        let mut query = world.query::<&LatticeElement>();
        let (mut horizontal, mut vertical) = (0, 0);
        for element in query.iter(&world) {
            match element {
                LatticeElement::HorizontalLine { .. } => horizontal += 1,
                LatticeElement::VerticalLine { .. } => vertical += 1,
                LatticeElement::Dot { .. } => panic!("line grid spawned a dot"),
            }
        }
        assert_eq!(horizontal, 5);
        assert_eq!(vertical, 11);
    }

    #[test]
    fn test_oversized_lattice_skipped() {
        let mut world = World::new();
        let mut grid = GridVisualizer::new(GridStyle::Dots, DEFAULT_GRID_THICKNESS);
        grid.spawn_grid(&mut world, &spec(1000.0, 1000.0, 0.1));
        assert!(grid.elements().is_empty());
        assert_eq!(grid.generation(), 1);
    }

    #[test]
    fn test_tiny_step_skipped_before_allocating() {
        let mut world = World::new();
        for style in [GridStyle::Dots, GridStyle::Lines] {
            let mut grid = GridVisualizer::new(style, DEFAULT_GRID_THICKNESS);
            grid.spawn_grid(&mut world, &spec(1.0, 1.0, 1.0));
            assert!(!grid.elements().is_empty());

            grid.spawn_grid(&mut world, &spec(1000.0, 1000.0, 1e-9));
            assert!(grid.elements().is_empty());
            assert_eq!(grid.generation(), 2);
        }
        let mut query = world.query::<&LatticeElement>();
        assert_eq!(query.iter(&world).count(), 0);
    }
}
