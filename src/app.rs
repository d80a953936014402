use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use bevy_ecs::prelude::*;
use log::{info, warn};
use nalgebra::Point2;

use chipforge_core::chip::{
    ChipDescription, ChipInstanceData, MonospaceTextMeasure, Palette, Point,
};
use chipforge_core::display::{
    DisplayOptions, GridDisplayMode, GridVisualizer, PinNameDisplayMode, ToggleState, WorkArea,
};
use chipforge_core::ecs::{
    chip_at, chip_entities, delete_chip, load_chip, relayout_chips, set_highlight_state,
    setup_editor_world, start_placing_chip, ChipSelection, ChipTheme, ChipTransform, HoveredChip,
    RenderOrder,
};
use chipforge_core::editor::{ChipMover, NonOverlappingPlacement, PlacementRules};
use chipforge_core::navigation::{
    axis_snapped_position_on_grid, install_view, reset_view_cache, InputSnapshot, ViewTransform,
};
use chipforge_core::project::{default_config_dir, EditorConfig};
use chipforge_core::{Bounds, Result};

use crate::render::{paint_editor, Overlay};

const CANVAS_MARGIN: f32 = 24.0;

const CHIP_LIBRARY: &[&str] = &[
    r##"{ "Name": "AND", "Colour": "#2E6BB0",
          "InputPins": [ { "Name": "A", "PositionY": 1.0, "ColourThemeName": "Red" },
                         { "Name": "B", "PositionY": 0.0, "ColourThemeName": "Red" } ],
          "OutputPins": [ { "Name": "Out", "PositionY": 0.0, "ColourThemeName": "Red" } ] }"##,
    r##"{ "Name": "NOT", "Colour": "#8B1E3F",
          "InputPins": [ { "Name": "In", "PositionY": 0.0, "ColourThemeName": "Red" } ],
          "OutputPins": [ { "Name": "Out", "PositionY": 0.0, "ColourThemeName": "Red" } ] }"##,
    r##"{ "Name": "HALF ADDER", "Colour": "#4C9A2A",
          "InputPins": [ { "Name": "A", "PositionY": 1.0, "ColourThemeName": "Blue" },
                         { "Name": "B", "PositionY": 0.0, "ColourThemeName": "Blue" } ],
          "OutputPins": [ { "Name": "Sum", "PositionY": 1.0, "ColourThemeName": "Green" },
                          { "Name": "Carry", "PositionY": 0.0, "ColourThemeName": "Yellow" } ] }"##,
    r##"{ "Name": "4 BIT REGISTER", "Colour": "#D9A441",
          "InputPins": [ { "Name": "D0", "PositionY": 3.0, "ColourThemeName": "Violet" },
                         { "Name": "D1", "PositionY": 2.0, "ColourThemeName": "Violet" },
                         { "Name": "D2", "PositionY": 1.0, "ColourThemeName": "Violet" },
                         { "Name": "D3", "PositionY": 0.0, "ColourThemeName": "Violet" },
                         { "Name": "Store", "PositionY": -1.0, "ColourThemeName": "Red" } ],
          "OutputPins": [ { "Name": "Q0", "PositionY": 3.0, "ColourThemeName": "Violet" },
                          { "Name": "Q1", "PositionY": 2.0, "ColourThemeName": "Violet" },
                          { "Name": "Q2", "PositionY": 1.0, "ColourThemeName": "Violet" },
                          { "Name": "Q3", "PositionY": 0.0, "ColourThemeName": "Violet" } ] }"##,
];

pub struct EditorApp {
    world: World,
    work_area: WorkArea,
    mover: ChipMover,
    config: EditorConfig,
    config_dir: Option<PathBuf>,
    text: MonospaceTextMeasure,
    library: Vec<ChipDescription>,
    /// Freshly added chip following the mouse until dropped
    placing: Option<Entity>,
    pin_names_toggled: bool,
    moves_reported: Rc<Cell<u64>>,
    status: String,
}

impl EditorApp {
    pub fn new() -> Result<Self> {
        reset_view_cache();

        let config_dir = default_config_dir();
        let mut config = match config_dir.as_deref() {
            Some(dir) => EditorConfig::load_from_file(dir).unwrap_or_else(|err| {
                warn!("Could not read editor config: {}, using defaults", err);
                EditorConfig::default()
            }),
            None => EditorConfig::default(),
        };
        let spec = match config.grid_spec() {
            Ok(spec) => spec,
            Err(err) => {
                warn!("Stored grid is unusable: {}, using defaults", err);
                config = EditorConfig::default();
                config.grid_spec()?
            }
        };

        let mut world = setup_editor_world(config.display_options);
        world.insert_resource(ChipTheme {
            style: config.chip_style,
            palette: Palette::default(),
        });

        let mut work_area = WorkArea::new(spec);
        GridVisualizer::set_up(&mut world, &mut work_area, config.grid_style, config.grid_thickness);

        let moves_reported = Rc::new(Cell::new(0));
        let counter = moves_reported.clone();
        let mut mover = ChipMover::new();
        mover.subscribe_chips_moved(Box::new(move |_: &mut World, _: &[Entity]| {
            counter.set(counter.get() + 1);
        }));

        let library: Vec<ChipDescription> = CHIP_LIBRARY
            .iter()
            .filter_map(|json| match ChipDescription::from_json(json) {
                Ok(description) => Some(description),
                Err(err) => {
                    warn!("Skipping library chip: {}", err);
                    None
                }
            })
            .collect();

        let mut app = Self {
            world,
            work_area,
            mover,
            config,
            config_dir,
            text: MonospaceTextMeasure::default(),
            library,
            placing: None,
            pin_names_toggled: false,
            moves_reported,
            status: String::new(),
        };
        app.load_demo_layout();
        Ok(app)
    }

    fn load_demo_layout(&mut self) {
        let positions = [(-4.0, 2.0), (-4.0, -1.0), (1.0, 1.0), (4.5, -1.5)];
        let discretization = self.work_area.discretization();
        for (id, (description, (x, y))) in self.library.iter().zip(positions).enumerate() {
            let instance = ChipInstanceData {
                name: description.name.clone(),
                id: id as i32,
                points: vec![Point::new(x, y)],
            };
            load_chip(&mut self.world, description, &instance, discretization, &self.text);
        }
        info!("Loaded {} demo chips", self.library.len());
    }

    fn save_config(&mut self) {
        self.config.display_options = *self.world.resource::<DisplayOptions>();
        self.config.grid_discretization = self.work_area.discretization();
        self.config.work_area = *self.work_area.bounds();

        let Some(dir) = self.config_dir.as_deref() else {
            self.status = "No config directory on this platform".to_string();
            return;
        };
        self.status = match self.config.save_to_file(dir) {
            Ok(()) => format!("Settings saved to {}", dir.display()),
            Err(err) => {
                warn!("Saving editor config failed: {}", err);
                format!("Saving settings failed: {}", err)
            }
        };
    }

    fn set_discretization(&mut self, discretization: f32) {
        match self.work_area.set_discretization(&mut self.world, discretization) {
            Ok(()) => relayout_chips(&mut self.world, discretization, &self.text),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn handle_input(&mut self, input: &InputSnapshot, pointer_on_canvas: bool) {
        self.work_area.set_grid_snap(input.grid_snap_held);
        self.world
            .resource_mut::<GridVisualizer>()
            .tick(self.work_area.grid_snap(), input.toggle_grid_pressed);
        if input.toggle_pin_names_pressed {
            self.pin_names_toggled = !self.pin_names_toggled;
        }

        let hovered = chip_at(&mut self.world, input.mouse_world);
        self.world.resource_mut::<HoveredChip>().0 = hovered;

        if let Some(chip) = self.placing {
            self.continue_placing(chip, input, pointer_on_canvas);
            return;
        }

        if input.left_pressed && pointer_on_canvas {
            let mut selection = self.world.resource_mut::<ChipSelection>();
            match hovered {
                Some(chip) => {
                    if input.multi_select_held {
                        selection.toggle(chip);
                    } else if !selection.contains(chip) {
                        selection.select_only(chip);
                    }
                    self.mover.on_chip_pressed(input.mouse_world, true);
                }
                None if !input.multi_select_held => selection.0.clear(),
                None => {}
            }
        }

        if input.delete_pressed && !self.mover.is_busy() {
            let selected = std::mem::take(&mut self.world.resource_mut::<ChipSelection>().0);
            for chip in selected {
                self.mover.on_chip_deleted(&mut self.world, chip);
                delete_chip(&mut self.world, chip);
            }
        }

        let rules = NonOverlappingPlacement::new(*self.work_area.bounds());
        self.mover.tick(
            &mut self.world,
            input,
            self.work_area.grid_snap(),
            self.work_area.discretization(),
            &rules,
        );

        let selection = self.world.resource::<ChipSelection>().clone();
        for chip in chip_entities(&mut self.world) {
            set_highlight_state(&mut self.world, chip, selection.contains(chip));
        }
    }

    fn continue_placing(&mut self, chip: Entity, input: &InputSnapshot, pointer_on_canvas: bool) {
        let target = axis_snapped_position_on_grid(
            input.mouse_world,
            input.mouse_world,
            false,
            self.work_area.grid_snap(),
            self.work_area.discretization(),
            Some(self.work_area.bounds()),
        );
        if let Some(mut transform) = self.world.get_mut::<ChipTransform>(chip) {
            transform.position = target;
        }

        if input.right_pressed || input.escape_pressed {
            delete_chip(&mut self.world, chip);
            self.placing = None;
        } else if input.left_pressed && pointer_on_canvas {
            let rules = NonOverlappingPlacement::new(*self.work_area.bounds());
            if rules.is_valid_placement(&self.world, chip, &[chip]) {
                if let Some(mut transform) = self.world.get_mut::<ChipTransform>(chip) {
                    transform.z = RenderOrder::CHIP;
                }
                self.world.resource_mut::<ChipSelection>().select_only(chip);
                self.placing = None;
                self.status.clear();
            } else {
                self.status = "Chips cannot overlap or leave the work area".to_string();
            }
        }
    }

    fn show_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("chip_library").show(ctx, |ui| {
            ui.heading("Chips");
            let mut requested = None;
            for (index, description) in self.library.iter().enumerate() {
                if ui.button(description.name.as_str()).clicked() {
                    requested = Some(index);
                }
            }
            if let Some(index) = requested {
                if let Some(previous) = self.placing.take() {
                    delete_chip(&mut self.world, previous);
                }
                let description = self.library[index].clone();
                let discretization = self.work_area.discretization();
                match start_placing_chip(&mut self.world, &description, discretization, &self.text) {
                    Ok(chip) => self.placing = Some(chip),
                    Err(err) => {
                        warn!("Cannot place '{}': {}", description.name, err);
                        self.status = err.to_string();
                    }
                }
            }

            ui.separator();
            ui.heading("Display");
            let mut options = *self.world.resource::<DisplayOptions>();
            pin_name_combo(ui, "Chip pin names", &mut options.sub_chip_pin_name_mode);
            pin_name_combo(ui, "Editor pin names", &mut options.main_chip_pin_name_mode);
            let mut guide = options.show_cursor_guide.is_on();
            if ui.checkbox(&mut guide, "Cursor guide").changed() {
                options.show_cursor_guide = if guide { ToggleState::On } else { ToggleState::Off };
            }
            egui::ComboBox::from_label("Grid")
                .selected_text(format!("{:?}", options.grid_display_mode))
                .show_ui(ui, |ui| {
                    for mode in [
                        GridDisplayMode::Always,
                        GridDisplayMode::Sync,
                        GridDisplayMode::Toggle,
                        GridDisplayMode::Never,
                    ] {
                        ui.selectable_value(&mut options.grid_display_mode, mode, format!("{:?}", mode));
                    }
                });
            let previous = *self.world.resource::<DisplayOptions>();
            if options.grid_display_mode != previous.grid_display_mode {
                self.world
                    .resource_mut::<GridVisualizer>()
                    .set_grid_display_mode(options.grid_display_mode);
            }
            *self.world.resource_mut::<DisplayOptions>() = options;

            ui.separator();
            ui.heading("Grid");
            let mut step = self.work_area.discretization();
            if ui
                .add(egui::Slider::new(&mut step, 0.1..=1.0).step_by(0.05).text("Step"))
                .changed()
            {
                self.set_discretization(step);
            }
            let bounds = *self.work_area.bounds();
            let mut half_size = [bounds.width() / 2.0, bounds.height() / 2.0];
            let mut resized = false;
            ui.horizontal(|ui| {
                ui.label("Half size");
                resized |= ui.add(egui::DragValue::new(&mut half_size[0]).speed(0.1).range(1.0..=50.0)).changed();
                resized |= ui.add(egui::DragValue::new(&mut half_size[1]).speed(0.1).range(1.0..=50.0)).changed();
            });
            if resized {
                let bounds = Bounds::new(
                    Point2::new(-half_size[0], -half_size[1]),
                    Point2::new(half_size[0], half_size[1]),
                );
                if let Err(err) = self.work_area.resize(&mut self.world, bounds) {
                    self.status = err.to_string();
                }
            }

            ui.separator();
            if ui.button("Save settings").clicked() {
                self.save_config();
            }
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            let chip_count = chip_entities(&mut self.world).len();
            let grid_state = self.world.resource::<GridVisualizer>().state();
            ui.horizontal(|ui| {
                ui.label(format!("{} chips", chip_count));
                ui.separator();
                ui.label(format!("Mover: {:?}", self.mover.state()));
                ui.separator();
                ui.label(format!("Grid: {:?}", grid_state));
                ui.separator();
                ui.label(format!("Move notifications: {}", self.moves_reported.get()));
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(self.status.as_str());
                }
            });
        });
    }
}

fn pin_name_combo(ui: &mut egui::Ui, label: &str, mode: &mut PinNameDisplayMode) {
    egui::ComboBox::from_label(label)
        .selected_text(format!("{:?}", mode))
        .show_ui(ui, |ui| {
            for option in [
                PinNameDisplayMode::Always,
                PinNameDisplayMode::Hover,
                PinNameDisplayMode::Toggle,
                PinNameDisplayMode::Never,
            ] {
                ui.selectable_value(mode, option, format!("{:?}", option));
            }
        });
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show_side_panel(ctx);
        self.show_status_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let view = ViewTransform::fit(response.rect, self.work_area.bounds(), CANVAS_MARGIN);
            install_view(view);

            let input = ctx.input(|i| InputSnapshot::from_egui(i, &view));
            self.handle_input(&input, response.hovered());

            let show_guide = self
                .world
                .resource::<DisplayOptions>()
                .show_cursor_guide
                .is_on();
            let overlay = Overlay {
                pin_names_toggled: self.pin_names_toggled,
                cursor_guide: show_guide.then(|| {
                    axis_snapped_position_on_grid(
                        input.mouse_world,
                        input.mouse_world,
                        false,
                        self.work_area.grid_snap(),
                        self.work_area.discretization(),
                        Some(self.work_area.bounds()),
                    )
                }),
            };
            paint_editor(&painter, &mut self.world, &view, self.work_area.bounds(), &overlay);
        });

        if self.mover.is_busy() || self.placing.is_some() {
            ctx.request_repaint();
        }
    }
}
