use bevy_ecs::world::World;
use log::debug;

use crate::editor::{SubscriptionId, Subscribers};
use crate::geometry::{Bounds, GridSpec};
use crate::Result;

/// Callback run after the work area bounds change
pub type ResizedCallback = dyn FnMut(&mut World, &GridSpec);

/// Editable region of the editor: its lattice and the grid-snap modifier
pub struct WorkArea {
    spec: GridSpec,
    grid_snap: bool,
    resized: Subscribers<ResizedCallback>,
}

impl WorkArea {
    pub fn new(spec: GridSpec) -> Self {
        Self {
            spec,
            grid_snap: false,
            resized: Subscribers::default(),
        }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn bounds(&self) -> &Bounds {
        self.spec.bounds()
    }

    pub fn discretization(&self) -> f32 {
        self.spec.discretization()
    }

    /// Whether dragged chips snap to the lattice this tick
    pub fn grid_snap(&self) -> bool {
        self.grid_snap
    }

    pub fn set_grid_snap(&mut self, grid_snap: bool) {
        self.grid_snap = grid_snap;
    }

    pub fn subscribe_resized(&mut self, callback: Box<ResizedCallback>) -> SubscriptionId {
        self.resized.subscribe(callback)
    }

    pub fn unsubscribe_resized(&mut self, id: SubscriptionId) -> bool {
        self.resized.unsubscribe(id)
    }

    pub fn resized_subscriber_count(&self) -> usize {
        self.resized.len()
    }

    /// Move the bounds and notify subscribers before returning.
    ///
    /// Invalid bounds leave the work area untouched.
    pub fn resize(&mut self, world: &mut World, bounds: Bounds) -> Result<()> {
        self.spec = GridSpec::new(self.spec.discretization(), bounds)?;
        self.notify_resized(world);
        Ok(())
    }

    /// Change the lattice step; subscribers are notified as for a resize
    pub fn set_discretization(&mut self, world: &mut World, discretization: f32) -> Result<()> {
        self.spec = GridSpec::new(discretization, *self.spec.bounds())?;
        self.notify_resized(world);
        Ok(())
    }

    fn notify_resized(&mut self, world: &mut World) {
        debug!(
            "Work area now {:?} to {:?}, step {}; notifying {} subscriber(s)",
            self.spec.bounds().min,
            self.spec.bounds().max,
            self.spec.discretization(),
            self.resized.len()
        );
        let spec = self.spec;
        for callback in self.resized.iter_mut() {
            callback(world, &spec);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use std::cell::Cell;
    use std::rc::Rc;

    fn work_area() -> WorkArea {
        let bounds = Bounds::new(Point2::new(0.0, 0.0), Point2::new(4.0, 3.0));
        WorkArea::new(GridSpec::new(0.5, bounds).unwrap())
    }

    #[test]
    fn test_resize_notifies_until_unsubscribed() {
        let mut world = World::new();
        let mut area = work_area();
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let id = area.subscribe_resized(Box::new(move |_: &mut World, spec: &GridSpec| {
            assert_eq!(spec.bounds().max, Point2::new(8.0, 6.0));
            seen.set(seen.get() + 1);
        }));

        let bigger = Bounds::new(Point2::new(0.0, 0.0), Point2::new(8.0, 6.0));
        area.resize(&mut world, bigger).unwrap();
        assert_eq!(calls.get(), 1);

        assert!(area.unsubscribe_resized(id));
        area.resize(&mut world, bigger).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(area.resized_subscriber_count(), 0);
    }

    #[test]
    fn test_invalid_resize_rejected() {
        let mut world = World::new();
        let mut area = work_area();
        let inverted = Bounds::new(Point2::new(1.0, 1.0), Point2::new(0.0, 0.0));
        assert!(area.resize(&mut world, inverted).is_err());
        assert_eq!(area.bounds().max, Point2::new(4.0, 3.0));
        assert!(area.set_discretization(&mut world, 0.0).is_err());
        assert_eq!(area.discretization(), 0.5);
    }
}
