use std::sync::RwLock;

use egui::{Pos2, Rect};
use nalgebra::{Point2, Vector2};
use once_cell::sync::Lazy;

use crate::geometry::{discretize_vector, Bounds};

/// Maps world units (y up) onto egui screen points (y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Screen position of the world origin
    pub origin: Pos2,
    pub pixels_per_unit: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            origin: Pos2::ZERO,
            pixels_per_unit: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn new(origin: Pos2, pixels_per_unit: f32) -> Self {
        Self { origin, pixels_per_unit }
    }

    /// Largest view that shows all of `bounds` inside `rect`, centred
    pub fn fit(rect: Rect, bounds: &Bounds, margin: f32) -> Self {
        let available = (rect.size() - egui::vec2(margin, margin) * 2.0).max(egui::vec2(1.0, 1.0));
        let width = bounds.width().max(f32::EPSILON);
        let height = bounds.height().max(f32::EPSILON);
        let pixels_per_unit = (available.x / width).min(available.y / height);

        let center = bounds.center();
        let origin = rect.center()
            + egui::vec2(-center.x * pixels_per_unit, center.y * pixels_per_unit);
        Self { origin, pixels_per_unit }
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Point2<f32> {
        Point2::new(
            (screen.x - self.origin.x) / self.pixels_per_unit,
            (self.origin.y - screen.y) / self.pixels_per_unit,
        )
    }

    pub fn world_to_screen(&self, world: Point2<f32>) -> Pos2 {
        Pos2::new(
            self.origin.x + world.x * self.pixels_per_unit,
            self.origin.y - world.y * self.pixels_per_unit,
        )
    }

    pub fn world_to_screen_size(&self, size: Vector2<f32>) -> egui::Vec2 {
        egui::vec2(size.x, size.y) * self.pixels_per_unit
    }
}

// Process-wide view, filled in by whoever owns the canvas
static VIEW_CACHE: Lazy<RwLock<Option<ViewTransform>>> = Lazy::new(|| RwLock::new(None));

pub fn install_view(view: ViewTransform) {
    let mut cache = VIEW_CACHE.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *cache = Some(view);
}

/// Forget the cached view; call at the start of every editor session
pub fn reset_view_cache() {
    let mut cache = VIEW_CACHE.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *cache = None;
}

/// The installed view, or the identity view if none is installed
pub fn current_view() -> ViewTransform {
    let cache = VIEW_CACHE.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    (*cache).unwrap_or_default()
}

pub fn screen_to_world(screen: Pos2) -> Point2<f32> {
    current_view().screen_to_world(screen)
}

pub fn world_to_screen(world: Point2<f32>) -> Pos2 {
    current_view().world_to_screen(world)
}

/// With `snap`, keep only the dominant axis of the movement away from `origin`
pub fn axis_snapped_position(origin: Point2<f32>, mouse: Point2<f32>, snap: bool) -> Point2<f32> {
    if !snap {
        return mouse;
    }
    let delta = mouse - origin;
    if delta.x.abs() > delta.y.abs() {
        Point2::new(mouse.x, origin.y)
    } else {
        Point2::new(origin.x, mouse.y)
    }
}

/// [`axis_snapped_position`], then snapped to the lattice when `grid_snap` is set
pub fn axis_snapped_position_on_grid(
    origin: Point2<f32>,
    mouse: Point2<f32>,
    snap: bool,
    grid_snap: bool,
    discretization: f32,
    bounds: Option<&Bounds>,
) -> Point2<f32> {
    let position = axis_snapped_position(origin, mouse, snap);
    if grid_snap {
        discretize_vector(position.coords, discretization, bounds).into()
    } else {
        position
    }
}
