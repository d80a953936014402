//! Editor controllers: observer registry, placement rules and the chip mover.

pub mod mover;
pub mod observer;
pub mod placement;

pub use mover::{ChipMover, ChipsMovedCallback, MoverState, DRAG_THRESHOLD};
pub use observer::{SubscriptionId, Subscribers};
pub use placement::{NonOverlappingPlacement, PlacementRules};
