use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::chip::ChipStyle;
use crate::display::grid::DEFAULT_GRID_THICKNESS;
use crate::display::DisplayOptions;
use crate::ecs::GridStyle;
use crate::geometry::{Bounds, GridSpec};
use crate::Result;

pub const CONFIG_FILE_NAME: &str = "editor_config.json";

/// `<platform config dir>/chipforge`
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chipforge"))
}

/// Editor settings persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub display_options: DisplayOptions,
    pub grid_discretization: f32,
    pub grid_style: GridStyle,
    pub grid_thickness: f32,
    pub work_area: Bounds,
    pub chip_style: ChipStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            display_options: DisplayOptions::default(),
            grid_discretization: 0.25,
            grid_style: GridStyle::Dots,
            grid_thickness: DEFAULT_GRID_THICKNESS,
            work_area: Bounds::new(Point2::new(-8.0, -4.5), Point2::new(8.0, 4.5)),
            chip_style: ChipStyle::default(),
        }
    }
}

impl EditorConfig {
    /// Validated lattice for the configured work area
    pub fn grid_spec(&self) -> Result<GridSpec> {
        GridSpec::new(self.grid_discretization, self.work_area)
    }

    pub fn save_to_file(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::create_dir_all(dir)?;
        fs::write(dir.join(CONFIG_FILE_NAME), json)?;
        Ok(())
    }

    /// Load from `dir`, falling back to defaults when no file exists yet
    pub fn load_from_file(dir: &Path) -> Result<Self> {
        let json_path = dir.join(CONFIG_FILE_NAME);
        if json_path.exists() {
            let json = fs::read_to_string(&json_path)?;
            let config: EditorConfig = serde_json::from_str(&json)?;
            info!("Loaded editor config from {}", json_path.display());
            Ok(config)
        } else {
            Ok(EditorConfig::default())
        }
    }
}
