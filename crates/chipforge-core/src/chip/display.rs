use bevy_ecs::prelude::*;
use egui::Color32;
use log::warn;
use nalgebra::Point2;

use super::colour::{self, Palette, PinColourTheme};
use super::description::{ChipDescription, ChipInstanceData, PinSide, Point};
use super::layout::{compute_layout, ChipLayout, ChipStyle};
use super::text::TextMeasure;
use crate::ecs::ChipTransform;
use crate::geometry::Bounds;

/// World-space footprint queries
pub trait BoundsQueryable {
    /// Interaction bounds (body plus outline) at the chip's current position
    fn bounds(&self, transform: &ChipTransform) -> Bounds;
}

/// Snapshot for persistence code outside the editor
pub trait Serializable {
    fn instance_data(&self, transform: &ChipTransform) -> ChipInstanceData;
}

/// Hooks the editor calls while a chip is being placed or moved
pub trait Placeable {
    /// Let pins (and anything wired to them) know the chip moved
    fn notify_moved(&mut self);
    fn set_highlight_state(&mut self, highlighted: bool);
}

/// Everything that shapes how a chip looks, apart from its description
#[derive(Clone, Copy)]
pub struct ChipAppearance<'a> {
    pub style: &'a ChipStyle,
    pub palette: &'a Palette,
    pub text: &'a dyn TextMeasure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PinDisplay {
    pub name: String,
    pub side: PinSide,
    /// Centre relative to the chip centre
    pub local_position: Point2<f32>,
    pub theme: PinColourTheme,
    /// Bumped by every `notify_moved`; wire code compares against its last seen value
    pub move_count: u64,
}

/// A standard chip: coloured body, wrapped name label, pins on both edges
#[derive(Component, Debug, Clone)]
pub struct ChipDisplay {
    pub name: String,
    pub id: i32,
    pub description: ChipDescription,
    pub layout: ChipLayout,
    pub body_colour: Color32,
    pub outline_colour: Color32,
    pub text_colour: Color32,
    pub highlighted: bool,
    pub pins: Vec<PinDisplay>,
}

impl ChipDisplay {
    pub fn new(
        description: &ChipDescription,
        id: i32,
        discretization: f32,
        appearance: &ChipAppearance<'_>,
    ) -> Self {
        let body_colour = colour::parse_html_colour(&description.colour).unwrap_or_else(|err| {
            warn!("Chip '{}': {}, using fallback colour", description.name, err);
            colour::FALLBACK_CHIP_COLOUR
        });

        let mut chip = Self {
            name: description.name.clone(),
            id,
            description: description.clone(),
            layout: ChipLayout::default(),
            body_colour,
            outline_colour: colour::darken(body_colour, appearance.style.outline_darken_amount, 0.0),
            text_colour: colour::text_black_or_white(body_colour),
            highlighted: false,
            pins: Vec::new(),
        };
        chip.relayout(discretization, appearance);
        chip
    }

    /// Recompute the footprint, e.g. after the grid step changed
    pub fn relayout(&mut self, discretization: f32, appearance: &ChipAppearance<'_>) {
        let layout = compute_layout(
            &self.name,
            &self.description.input_pins,
            &self.description.output_pins,
            discretization,
            appearance.style,
            appearance.text,
        );

        self.pins = layout
            .pins
            .iter()
            .map(|placement| {
                let source = match placement.side {
                    PinSide::Input => &self.description.input_pins[placement.source_index],
                    PinSide::Output => &self.description.output_pins[placement.source_index],
                };
                PinDisplay {
                    name: source.name.clone(),
                    side: placement.side,
                    local_position: placement.local_position,
                    theme: appearance.palette.get_theme(&source.colour_theme_name).clone(),
                    move_count: 0,
                }
            })
            .collect();
        self.layout = layout;
    }

    /// Outline colour as currently drawn
    pub fn current_outline_colour(&self) -> Color32 {
        if self.highlighted {
            Color32::BLACK
        } else {
            self.outline_colour
        }
    }

    pub fn pin_world_position(&self, pin: &PinDisplay, transform: &ChipTransform) -> Point2<f32> {
        transform.position + pin.local_position.coords
    }
}

impl BoundsQueryable for ChipDisplay {
    fn bounds(&self, transform: &ChipTransform) -> Bounds {
        Bounds::from_center_size(transform.position, self.layout.interaction_size())
    }
}

impl Serializable for ChipDisplay {
    fn instance_data(&self, transform: &ChipTransform) -> ChipInstanceData {
        ChipInstanceData {
            name: self.name.clone(),
            id: self.id,
            points: vec![Point::new(transform.position.x, transform.position.y)],
        }
    }
}

impl Placeable for ChipDisplay {
    fn notify_moved(&mut self) {
        for pin in &mut self.pins {
            pin.move_count += 1;
        }
    }

    fn set_highlight_state(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }
}
