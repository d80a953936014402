use bevy_ecs::prelude::*;
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, StrokeKind};
use nalgebra::Point2;

use chipforge_core::chip::{ChipDisplay, PinSide};
use chipforge_core::display::{DisplayOptions, GridVisualizer};
use chipforge_core::ecs::{ChipTheme, ChipTransform, HoveredChip, LatticeElement};
use chipforge_core::geometry::Bounds;
use chipforge_core::navigation::ViewTransform;

const BACKGROUND_COLOUR: Color32 = Color32::from_gray(32);
const WORK_AREA_COLOUR: Color32 = Color32::from_gray(46);
const LATTICE_COLOUR: Color32 = Color32::from_rgba_premultiplied(90, 90, 90, 160);
const CURSOR_GUIDE_COLOUR: Color32 = Color32::from_rgba_premultiplied(120, 160, 220, 120);
const PIN_NAME_COLOUR: Color32 = Color32::from_gray(220);

/// Per-frame state the painter needs besides the world
pub struct Overlay {
    pub pin_names_toggled: bool,
    /// Snapped mouse position for the cursor guide, if shown
    pub cursor_guide: Option<Point2<f32>>,
}

fn screen_rect(view: &ViewTransform, bounds: &Bounds) -> Rect {
    Rect::from_two_pos(
        view.world_to_screen(bounds.min),
        view.world_to_screen(bounds.max),
    )
}

pub fn paint_editor(
    painter: &Painter,
    world: &mut World,
    view: &ViewTransform,
    work_area: &Bounds,
    overlay: &Overlay,
) {
    painter.rect_filled(painter.clip_rect(), 0.0, BACKGROUND_COLOUR);
    let area_rect = screen_rect(view, work_area);
    painter.rect_filled(area_rect, 0.0, WORK_AREA_COLOUR);

    paint_lattice(painter, world, view, area_rect);
    paint_chips(painter, world, view, overlay);

    if let Some(cursor) = overlay.cursor_guide {
        let at = view.world_to_screen(cursor);
        let stroke = Stroke::new(1.0, CURSOR_GUIDE_COLOUR);
        painter.line_segment([Pos2::new(area_rect.min.x, at.y), Pos2::new(area_rect.max.x, at.y)], stroke);
        painter.line_segment([Pos2::new(at.x, area_rect.min.y), Pos2::new(at.x, area_rect.max.y)], stroke);
    }
}

fn paint_lattice(painter: &Painter, world: &mut World, view: &ViewTransform, area_rect: Rect) {
    let visible = world
        .get_resource::<GridVisualizer>()
        .is_some_and(|grid| grid.is_visible());
    if !visible {
        return;
    }

    let mut query = world.query::<&LatticeElement>();
    for element in query.iter(world) {
        match *element {
            LatticeElement::Dot { position, size } => {
                let size = view.world_to_screen_size(size).max(egui::vec2(1.0, 1.0));
                painter.rect_filled(
                    Rect::from_center_size(view.world_to_screen(position), size),
                    0.0,
                    LATTICE_COLOUR,
                );
            }
            LatticeElement::HorizontalLine { y, thickness } => {
                let screen_y = view.world_to_screen(Point2::new(0.0, y)).y;
                painter.line_segment(
                    [Pos2::new(area_rect.min.x, screen_y), Pos2::new(area_rect.max.x, screen_y)],
                    Stroke::new((thickness * view.pixels_per_unit).max(1.0), LATTICE_COLOUR),
                );
            }
            LatticeElement::VerticalLine { x, thickness } => {
                let screen_x = view.world_to_screen(Point2::new(x, 0.0)).x;
                painter.line_segment(
                    [Pos2::new(screen_x, area_rect.min.y), Pos2::new(screen_x, area_rect.max.y)],
                    Stroke::new((thickness * view.pixels_per_unit).max(1.0), LATTICE_COLOUR),
                );
            }
        }
    }
}

fn paint_chips(painter: &Painter, world: &mut World, view: &ViewTransform, overlay: &Overlay) {
    let pin_size = world
        .get_resource::<ChipTheme>()
        .map(|theme| theme.style.pin_size)
        .unwrap_or_default();
    let pin_name_mode = world
        .get_resource::<DisplayOptions>()
        .map(|options| options.sub_chip_pin_name_mode)
        .unwrap_or_default();
    let hovered = world.get_resource::<HoveredChip>().and_then(|hovered| hovered.0);

    let mut query = world.query::<(Entity, &ChipDisplay, &ChipTransform)>();
    let mut chips: Vec<_> = query.iter(world).collect();
    chips.sort_by(|(_, _, a), (_, _, b)| a.z.total_cmp(&b.z));

    let ppu = view.pixels_per_unit;
    for (entity, chip, transform) in chips {
        let center = view.world_to_screen(transform.position);
        let layout = &chip.layout;

        if chip.highlighted {
            let highlight = Rect::from_center_size(center, view.world_to_screen_size(layout.highlight_size));
            painter.rect_filled(highlight, 0.0, chip.current_outline_colour());
        }
        let body = Rect::from_center_size(center, view.world_to_screen_size(layout.size));
        painter.rect_filled(body, 0.0, chip.body_colour);
        painter.rect_stroke(
            body,
            0.0,
            Stroke::new(layout.outline_width * ppu, chip.current_outline_colour()),
            StrokeKind::Middle,
        );
        painter.text(
            center,
            Align2::CENTER_CENTER,
            &layout.display_name,
            FontId::monospace(layout.font_size * ppu),
            chip.text_colour,
        );

        let show_names = pin_name_mode.should_show(hovered == Some(entity), overlay.pin_names_toggled);
        for pin in &chip.pins {
            let at = view.world_to_screen(chip.pin_world_position(pin, transform));
            painter.circle_filled(at, pin_size * ppu / 2.0, pin.theme.low);
            if show_names {
                let (anchor, offset) = match pin.side {
                    PinSide::Input => (Align2::RIGHT_CENTER, -pin_size * ppu),
                    PinSide::Output => (Align2::LEFT_CENTER, pin_size * ppu),
                };
                painter.text(
                    at + egui::vec2(offset, 0.0),
                    anchor,
                    &pin.name,
                    FontId::proportional(pin_size * ppu),
                    PIN_NAME_COLOUR,
                );
            }
        }
    }
}
