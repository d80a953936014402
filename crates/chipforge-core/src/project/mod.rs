pub mod config;

pub use config::{default_config_dir, EditorConfig, CONFIG_FILE_NAME};
