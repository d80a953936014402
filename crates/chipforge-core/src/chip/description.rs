use serde::{Deserialize, Serialize};

use crate::{ChipForgeError, Result};

/// Which edge of the chip body a pin sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinSide {
    Input,
    Output,
}

/// Declared pin as read from a chip description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PinDescription {
    pub name: String,
    /// Y position in the chip's own editor; only the ordering matters here
    pub position_y: f32,
    pub colour_theme_name: String,
}

/// Chip definition produced by external serialization code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChipDescription {
    pub name: String,
    /// HTML colour string, e.g. `#3A6EA5`
    pub colour: String,
    pub input_pins: Vec<PinDescription>,
    pub output_pins: Vec<PinDescription>,
}

impl ChipDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        let description: ChipDescription = serde_json::from_str(json)?;
        if description.name.trim().is_empty() {
            return Err(ChipForgeError::Description("chip name is empty".to_string()));
        }
        Ok(description)
    }

    pub fn max_pins_on_one_side(&self) -> usize {
        self.input_pins.len().max(self.output_pins.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Placement snapshot of one chip instance, persisted elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChipInstanceData {
    pub name: String,
    #[serde(rename = "ID")]
    pub id: i32,
    pub points: Vec<Point>,
}
