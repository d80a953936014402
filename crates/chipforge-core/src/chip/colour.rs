use egui::Color32;
use egui::ecolor::Hsva;

use crate::{ChipForgeError, Result};

/// Body colour used when a description carries an unparsable colour
pub const FALLBACK_CHIP_COLOUR: Color32 = Color32::from_rgb(128, 128, 128);

/// Parse an HTML hex colour (`#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`)
pub fn parse_html_colour(colour: &str) -> Result<Color32> {
    let trimmed = colour.trim();
    let hex = if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{trimmed}")
    };
    Color32::from_hex(&hex).map_err(|_| ChipForgeError::InvalidColour(colour.to_string()))
}

/// Lower the HSV value by `darken_amount` and the saturation by `desaturate_amount`
pub fn darken(colour: Color32, darken_amount: f32, desaturate_amount: f32) -> Color32 {
    let mut hsva = Hsva::from(colour);
    hsva.s = (hsva.s - desaturate_amount).clamp(0.0, 1.0);
    hsva.v = (hsva.v - darken_amount).clamp(0.0, 1.0);
    Color32::from(hsva)
}

/// Black text on light backgrounds, white text on dark ones
pub fn text_black_or_white(background: Color32) -> Color32 {
    let luminance = (0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32)
        / 255.0;
    if luminance > 0.5 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

/// Colours a pin uses for its low and high logic states
#[derive(Debug, Clone, PartialEq)]
pub struct PinColourTheme {
    pub name: String,
    pub low: Color32,
    pub high: Color32,
}

/// Named pin colour themes; unknown names fall back to the first theme
#[derive(Debug, Clone)]
pub struct Palette {
    themes: Vec<PinColourTheme>,
}

impl Palette {
    pub fn new(themes: Vec<PinColourTheme>) -> Self {
        Self { themes }
    }

    pub fn get_theme(&self, name: &str) -> &PinColourTheme {
        self.themes
            .iter()
            .find(|theme| theme.name.eq_ignore_ascii_case(name))
            .or_else(|| self.themes.first())
            .unwrap_or(&DEFAULT_THEME)
    }

    pub fn themes(&self) -> &[PinColourTheme] {
        &self.themes
    }
}

static DEFAULT_THEME: PinColourTheme = PinColourTheme {
    name: String::new(),
    low: Color32::from_rgb(40, 40, 40),
    high: Color32::from_rgb(220, 50, 47),
};

impl Default for Palette {
    fn default() -> Self {
        let theme = |name: &str, low: Color32, high: Color32| PinColourTheme {
            name: name.to_string(),
            low,
            high,
        };
        Self::new(vec![
            theme("Red", Color32::from_rgb(48, 22, 22), Color32::from_rgb(231, 52, 52)),
            theme("Green", Color32::from_rgb(20, 44, 24), Color32::from_rgb(58, 204, 82)),
            theme("Blue", Color32::from_rgb(20, 30, 52), Color32::from_rgb(64, 132, 236)),
            theme("Yellow", Color32::from_rgb(50, 46, 18), Color32::from_rgb(240, 210, 60)),
            theme("Violet", Color32::from_rgb(40, 22, 50), Color32::from_rgb(170, 90, 230)),
        ])
    }
}
