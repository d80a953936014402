// Platform module
pub mod banner;

pub mod parameters {
    pub mod gui {
        pub const APPLICATION_NAME: &str = "ChipForge Logic Chip Editor";
        pub const VERSION: &str = env!("CARGO_PKG_VERSION");
        pub const VIEWPORT_X: f32 = 1280.0;
        pub const VIEWPORT_Y: f32 = 768.0;
    }
}
