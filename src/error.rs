use std::path::PathBuf;

use crate::game::MoveError;

/// Errors that end the interactive loop.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("game state error: {0}")]
    Game(#[from] MoveError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
