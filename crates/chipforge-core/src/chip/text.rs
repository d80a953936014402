use nalgebra::Vector2;
use unicode_width::UnicodeWidthStr;

/// Text measurement service used to size chip labels.
pub trait TextMeasure {
    /// Unwrapped size of `text` (which may contain `\n`) at `font_size` world units
    fn preferred_size(&self, text: &str, font_size: f32) -> Vector2<f32>;
}

/// Fixed-advance estimate: every terminal column is `advance` em wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceTextMeasure {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for MonospaceTextMeasure {
    fn default() -> Self {
        Self {
            advance: 0.6,
            line_height: 1.2,
        }
    }
}

impl TextMeasure for MonospaceTextMeasure {
    fn preferred_size(&self, text: &str, font_size: f32) -> Vector2<f32> {
        if text.is_empty() {
            return Vector2::zeros();
        }
        let columns = text.lines().map(|line| line.width()).max().unwrap_or(0);
        let lines = text.lines().count().max(1);
        Vector2::new(
            columns as f32 * self.advance * font_size,
            lines as f32 * self.line_height * font_size,
        )
    }
}
