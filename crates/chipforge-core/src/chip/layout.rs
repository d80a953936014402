//! Chip footprint computation.
//!
//! The body width and height are chosen so that the outer outline and every
//! pin centre fall on the lattice. `padding_y` and `pin_spacing_factor` are
//! minimums: both may grow by up to one grid step to reach a lattice point.

use log::debug;
use nalgebra::{Point2, Vector2};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::description::{PinDescription, PinSide};
use super::text::TextMeasure;
use crate::geometry::discretize_up;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Formatted names at least this long are drawn with a smaller font
pub const LONG_NAME_THRESHOLD: usize = 6;
/// Font multiplier applied to long names
pub const LONG_NAME_FONT_SCALE: f32 = 0.75;

/// Tunable chip appearance, in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChipStyle {
    pub show_chip_name: bool,
    pub padding_x: f32,
    pub padding_y: f32,
    pub pin_spacing_factor: f32,
    pub outline_width: f32,
    pub pin_size: f32,
    pub font_size: f32,
    pub highlight_padding: f32,
    /// Body size used in place of the label when names are hidden
    pub fallback_body_size: [f32; 2],
    pub outline_darken_amount: f32,
}

impl Default for ChipStyle {
    fn default() -> Self {
        Self {
            show_chip_name: true,
            padding_x: 0.2,
            padding_y: 0.15,
            pin_spacing_factor: 0.08,
            outline_width: 0.03,
            pin_size: 0.12,
            font_size: 0.2,
            highlight_padding: 0.06,
            fallback_body_size: [0.5, 0.5],
            outline_darken_amount: 0.25,
        }
    }
}

/// A pin's slot on the computed body
#[derive(Debug, Clone, PartialEq)]
pub struct PinPlacement {
    pub side: PinSide,
    /// Index into the description's pin list for this side
    pub source_index: usize,
    /// Centre of the pin relative to the chip centre
    pub local_position: Point2<f32>,
}

/// Rendered footprint of a chip, derived from its description and the grid
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChipLayout {
    pub display_name: String,
    pub font_size: f32,
    /// Body size, excluding the outline
    pub size: Vector2<f32>,
    pub outline_width: f32,
    pub discretized_pin_distance: f32,
    pub pin_span: f32,
    pub height_in_steps: i64,
    pub pins: Vec<PinPlacement>,
    pub highlight_size: Vector2<f32>,
}

impl ChipLayout {
    /// Body plus outline; this is what aligns with the lattice
    pub fn interaction_size(&self) -> Vector2<f32> {
        self.size + Vector2::repeat(self.outline_width)
    }

    pub fn pins_on(&self, side: PinSide) -> impl Iterator<Item = &PinPlacement> + '_ {
        self.pins.iter().filter(move |pin| pin.side == side)
    }
}

/// Wrap `name` into lines no longer than its longest word.
///
/// Whitespace runs collapse to a single space and words keep their order.
pub fn format_name(name: &str) -> String {
    let collapsed = WHITESPACE.replace_all(name, " ");
    let words: Vec<&str> = collapsed.split(' ').collect();
    let max_word_length = words.iter().map(|w| w.chars().count()).max().unwrap_or(0);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in words {
        let current_len = current.chars().count();
        if current_len + word.chars().count() > max_word_length {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines.join("\n")
}

/// Compute the footprint of a chip whose pins must land on a lattice of
/// step `discretization`.
pub fn compute_layout(
    name: &str,
    input_pins: &[PinDescription],
    output_pins: &[PinDescription],
    discretization: f32,
    style: &ChipStyle,
    text: &dyn TextMeasure,
) -> ChipLayout {
    let display_name = format_name(name);
    let font_size = if display_name.chars().count() >= LONG_NAME_THRESHOLD {
        style.font_size * LONG_NAME_FONT_SCALE
    } else {
        style.font_size
    };

    let display_size = if style.show_chip_name {
        text.preferred_size(&display_name, font_size)
    } else {
        Vector2::from(style.fallback_body_size)
    };

    let padding_x = if style.show_chip_name { style.padding_x } else { 0.0 };
    let chip_size_x = discretize_up(display_size.x + padding_x, discretization) - style.outline_width;

    let discretized_pin_distance =
        discretize_up(style.pin_size + style.pin_spacing_factor, discretization);
    let max_pins_on_one_side = input_pins.len().max(output_pins.len());
    let pin_span = max_pins_on_one_side.saturating_sub(1) as f32 * discretized_pin_distance
        + style.pin_size;

    let predicted_height = pin_span.max(display_size.y) + style.padding_y;
    let height_in_steps = corrected_height_in_steps(
        (predicted_height / discretization).ceil() as i64,
        max_pins_on_one_side,
        (discretized_pin_distance / discretization).round() as i64,
    );
    let chip_size_y = height_in_steps as f32 * discretization - style.outline_width;

    let pin_start_y = (pin_span - style.pin_size) / 2.0;
    let mut pins = place_pins(input_pins, PinSide::Input, -chip_size_x / 2.0, pin_start_y);
    pins.extend(place_pins(output_pins, PinSide::Output, chip_size_x / 2.0, pin_start_y));

    let size = Vector2::new(chip_size_x, chip_size_y);
    debug!(
        "Layout for '{}': size {:.3}x{:.3}, {} steps high, pin distance {:.3}",
        name, size.x, size.y, height_in_steps, discretized_pin_distance
    );

    ChipLayout {
        display_name,
        font_size,
        size,
        outline_width: style.outline_width,
        discretized_pin_distance,
        pin_span,
        height_in_steps,
        pins,
        highlight_size: size + Vector2::repeat(style.highlight_padding),
    }
}

/// Adjust the body height (in grid steps) so pins spread symmetrically
/// about the centre still land on lattice rows.
///
/// An even pin count with an odd pin distance needs an odd height; an odd
/// pin count needs an even height.
pub fn corrected_height_in_steps(
    height_in_steps: i64,
    max_pins_on_one_side: usize,
    pin_distance_in_steps: i64,
) -> i64 {
    if max_pins_on_one_side % 2 == 0 {
        if pin_distance_in_steps % 2 == 1 && height_in_steps % 2 == 0 {
            return height_in_steps + 1;
        }
    } else if height_in_steps % 2 == 1 {
        return height_in_steps + 1;
    }
    height_in_steps
}

fn place_pins(
    descriptions: &[PinDescription],
    side: PinSide,
    x: f32,
    start_y: f32,
) -> Vec<PinPlacement> {
    let mut ordered: Vec<(usize, &PinDescription)> = descriptions.iter().enumerate().collect();
    // Stable: equal heights keep their declared order
    ordered.sort_by(|(_, a), (_, b)| b.position_y.total_cmp(&a.position_y));

    let end_y = -start_y;
    let count = ordered.len();
    ordered
        .into_iter()
        .enumerate()
        .map(|(rank, (source_index, _))| {
            let t = if count == 1 {
                0.5
            } else {
                rank as f32 / (count - 1) as f32
            };
            PinPlacement {
                side,
                source_index,
                local_position: Point2::new(x, start_y + (end_y - start_y) * t),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::text::MonospaceTextMeasure;
    use approx::assert_abs_diff_eq;

    fn pins(ys: &[f32]) -> Vec<PinDescription> {
        ys.iter()
            .enumerate()
            .map(|(i, y)| PinDescription {
                name: format!("P{i}"),
                position_y: *y,
                colour_theme_name: "Red".to_string(),
            })
            .collect()
    }

    /// Label small enough that the pins decide the height
    fn tiny_text_style() -> ChipStyle {
        ChipStyle {
            padding_x: 0.0,
            padding_y: 0.0,
            outline_width: 0.0,
            font_size: 0.1,
            ..ChipStyle::default()
        }
    }

    fn is_on_lattice(value: f32, step: f32) -> bool {
        let ratio = value / step;
        (ratio - ratio.round()).abs() < 1e-4
    }

    #[test]
    fn test_format_name_wraps_at_longest_word() {
        assert_eq!(format_name("AND"), "AND");
        assert_eq!(format_name("HALF ADDER"), "HALF\nADDER");
        assert_eq!(format_name("4 BIT   ADDER"), "4 BIT\nADDER");
        assert_eq!(format_name("a b c d"), "a\nb\nc\nd");
        assert_eq!(format_name("MEMORY\tCELL 8"), "MEMORY\nCELL 8");
    }

    #[test]
    fn test_long_names_use_smaller_font() {
        let style = ChipStyle::default();
        let text = MonospaceTextMeasure::default();
        let short = compute_layout("NOT", &[], &[], 0.25, &style, &text);
        let long = compute_layout("HALF ADDER", &[], &[], 0.25, &style, &text);
        assert_abs_diff_eq!(short.font_size, style.font_size);
        assert_abs_diff_eq!(long.font_size, style.font_size * LONG_NAME_FONT_SCALE);
    }

    #[test]
    fn test_outer_outline_aligns_with_grid() {
        let style = ChipStyle::default();
        let text = MonospaceTextMeasure::default();
        let step = 0.25;
        for name in ["AND", "OR", "XNOR", "FULL ADDER", "REGISTER 16"] {
            let layout = compute_layout(name, &pins(&[1.0, 0.0]), &pins(&[0.0]), step, &style, &text);
            let outer = layout.interaction_size();
            assert!(is_on_lattice(outer.x, step), "{name}: width {}", outer.x);
            assert!(is_on_lattice(outer.y, step), "{name}: height {}", outer.y);
        }
    }

    #[test]
    fn test_even_pins_with_odd_distance_force_odd_height() {
        // pin size 0.5 + spacing 0.4 rounds up to a distance of one step
        let style = ChipStyle {
            pin_size: 0.5,
            pin_spacing_factor: 0.4,
            ..tiny_text_style()
        };
        let text = MonospaceTextMeasure::default();
        let layout = compute_layout("X", &pins(&[3.0, 2.0, 1.0, 0.0]), &[], 1.0, &style, &text);
        assert_abs_diff_eq!(layout.discretized_pin_distance, 1.0);
        // span 3.5 rounds up to 4 steps, then the parity rule makes it 5
        assert_eq!(layout.height_in_steps, 5);
        assert_eq!(layout.height_in_steps % 2, 1);
    }

    #[test]
    fn test_even_pins_with_even_distance_keep_height() {
        // pin size 0.5 + spacing 0.6 rounds up to a distance of two steps
        let style = ChipStyle {
            pin_size: 0.5,
            pin_spacing_factor: 0.6,
            ..tiny_text_style()
        };
        let text = MonospaceTextMeasure::default();
        let layout = compute_layout("X", &pins(&[3.0, 2.0, 1.0, 0.0]), &[], 1.0, &style, &text);
        assert_abs_diff_eq!(layout.discretized_pin_distance, 2.0);
        // span 3 * 2 + 0.5 = 6.5 rounds up to 7 steps and stays there
        assert_eq!(layout.height_in_steps, 7);
    }

    #[test]
    fn test_odd_pins_force_even_height() {
        let style = ChipStyle {
            pin_size: 0.5,
            pin_spacing_factor: 0.4,
            ..tiny_text_style()
        };
        let text = MonospaceTextMeasure::default();
        // span 2 * 1 + 0.5 = 2.5 rounds up to 3 steps, parity makes it 4
        let layout = compute_layout("X", &pins(&[2.0, 1.0, 0.0]), &pins(&[0.0]), 1.0, &style, &text);
        assert_eq!(layout.height_in_steps, 4);
        assert_eq!(layout.height_in_steps % 2, 0);
    }

    #[test]
    fn test_parity_rule_table() {
        assert_eq!(corrected_height_in_steps(4, 2, 1), 5);
        assert_eq!(corrected_height_in_steps(5, 2, 1), 5);
        assert_eq!(corrected_height_in_steps(4, 2, 2), 4);
        assert_eq!(corrected_height_in_steps(5, 2, 2), 5);
        assert_eq!(corrected_height_in_steps(3, 3, 1), 4);
        assert_eq!(corrected_height_in_steps(4, 3, 2), 4);
        assert_eq!(corrected_height_in_steps(1, 1, 1), 2);
        assert_eq!(corrected_height_in_steps(2, 0, 1), 3);
    }

    #[test]
    fn test_pins_land_on_lattice_rows() {
        let step = 0.25;
        let style = ChipStyle::default();
        let text = MonospaceTextMeasure::default();
        for count in 1..=6 {
            let ys: Vec<f32> = (0..count).map(|i| i as f32).collect();
            let layout = compute_layout("GATE", &pins(&ys), &pins(&[0.0]), step, &style, &text);
            // The chip centre sits half the outer height below a lattice row
            let top = layout.interaction_size().y / 2.0;
            for pin in layout.pins_on(PinSide::Input) {
                let from_top = top - pin.local_position.y;
                assert!(
                    is_on_lattice(from_top, step),
                    "{count} pins: pin at {} is {} below the top",
                    pin.local_position.y,
                    from_top
                );
            }
        }
    }

    #[test]
    fn test_pins_sorted_by_descending_y_and_stable() {
        let style = tiny_text_style();
        let text = MonospaceTextMeasure::default();
        let inputs = pins(&[-1.0, 2.0, 0.5, 0.5]);
        let layout = compute_layout("X", &inputs, &[], 0.25, &style, &text);
        let order: Vec<usize> = layout.pins_on(PinSide::Input).map(|p| p.source_index).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);

        let ys: Vec<f32> = layout
            .pins_on(PinSide::Input)
            .map(|p| p.local_position.y)
            .collect();
        assert!(ys.windows(2).all(|w| w[0] > w[1]));
        assert_abs_diff_eq!(ys[0], -ys[3], epsilon = 1e-6);
    }

    #[test]
    fn test_single_pin_is_centred() {
        let style = ChipStyle::default();
        let text = MonospaceTextMeasure::default();
        let layout = compute_layout("NOT", &pins(&[4.0]), &pins(&[-3.0]), 0.25, &style, &text);
        for pin in &layout.pins {
            assert_abs_diff_eq!(pin.local_position.y, 0.0);
        }
        let input = layout.pins_on(PinSide::Input).next().unwrap();
        let output = layout.pins_on(PinSide::Output).next().unwrap();
        assert_abs_diff_eq!(input.local_position.x, -layout.size.x / 2.0);
        assert_abs_diff_eq!(output.local_position.x, layout.size.x / 2.0);
    }

    #[test]
    fn test_hidden_name_uses_fallback_body() {
        let style = ChipStyle {
            show_chip_name: false,
            fallback_body_size: [0.9, 0.3],
            outline_width: 0.0,
            padding_y: 0.0,
            ..ChipStyle::default()
        };
        let text = MonospaceTextMeasure::default();
        let layout = compute_layout("A VERY LONG NAME INDEED", &[], &[], 0.25, &style, &text);
        // No horizontal padding without a label
        assert_abs_diff_eq!(layout.size.x, 1.0);
    }
}
