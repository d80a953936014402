use egui::ViewportBuilder;

mod app;
mod platform;
mod render;

use app::EditorApp;
use platform::banner::Banner;
use platform::parameters::gui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_default_env().init();

    let mut banner = Banner::new();
    banner.format();
    banner.log();

    eframe::run_native(
        gui::APPLICATION_NAME,
        eframe::NativeOptions {
            viewport: ViewportBuilder::default().with_inner_size([gui::VIEWPORT_X, gui::VIEWPORT_Y]),
            ..Default::default()
        },
        Box::new(|_cc| Ok(Box::new(EditorApp::new()?))),
    )
}
