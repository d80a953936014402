/// Draw depths; larger values are painted on top
pub struct RenderOrder;

impl RenderOrder {
    pub const BACKGROUND_GRID: f32 = 0.0;
    pub const CHIP: f32 = 10.0;
    pub const CHIP_PIN: f32 = 11.0;
    pub const CHIP_MOVING: f32 = 20.0;
    pub const CURSOR_GUIDE: f32 = 30.0;
}

/// Static choice of how the background lattice is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum GridStyle {
    #[default]
    Dots,
    Lines,
}
