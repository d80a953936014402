/// ChipForge result type
pub type Result<T> = std::result::Result<T, ChipForgeError>;

/// Errors that can occur while building editor state or loading configuration
#[derive(thiserror::Error, Debug)]
pub enum ChipForgeError {
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("invalid colour '{0}'")]
    InvalidColour(String),

    #[error("no chip ids left to allocate")]
    ChipIdsExhausted,

    #[error("chip description error: {0}")]
    Description(String),

    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration format error: {0}")]
    Json(#[from] serde_json::Error),
}
