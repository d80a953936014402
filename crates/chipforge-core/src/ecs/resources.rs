use bevy_ecs::prelude::*;

use crate::chip::Palette;
use crate::chip::ChipStyle;
use crate::{ChipForgeError, Result};

/// Chips currently selected, in selection order
#[derive(Resource, Debug, Clone, Default)]
pub struct ChipSelection(pub Vec<Entity>);

impl ChipSelection {
    pub fn contains(&self, entity: Entity) -> bool {
        self.0.contains(&entity)
    }

    pub fn select_only(&mut self, entity: Entity) {
        self.0.clear();
        self.0.push(entity);
    }

    /// Add when absent, remove when present
    pub fn toggle(&mut self, entity: Entity) {
        if let Some(index) = self.0.iter().position(|e| *e == entity) {
            self.0.remove(index);
        } else {
            self.0.push(entity);
        }
    }
}

/// Chip under the mouse this frame, if any
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct HoveredChip(pub Option<Entity>);

/// Hands out instance ids for newly placed chips
#[derive(Resource, Debug, Clone, Default)]
pub struct ChipIdAllocator {
    /// Wider than the ids so reserving `i32::MAX` cannot overflow
    next: i64,
}

impl ChipIdAllocator {
    pub fn allocate(&mut self) -> Result<i32> {
        let id = i32::try_from(self.next).map_err(|_| ChipForgeError::ChipIdsExhausted)?;
        self.next += 1;
        Ok(id)
    }

    /// Make sure ids loaded from elsewhere are never handed out again
    pub fn reserve(&mut self, id: i32) {
        self.next = self.next.max(i64::from(id) + 1);
    }
}

/// Chip look shared by every chip in the world
#[derive(Resource, Debug, Clone, Default)]
pub struct ChipTheme {
    pub style: ChipStyle,
    pub palette: Palette,
}
