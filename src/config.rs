use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

/// Board shape and winning rule. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_height: usize,
    pub board_width: usize,
    /// Consecutive pieces needed to win
    pub win_length: usize,
    /// Count diagonal lines as wins (off: only rows and columns win)
    pub diagonal_wins: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board_height: 8,
            board_width: 8,
            win_length: 4,
            diagonal_wins: false,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_height == 0 {
            return Err(ConfigError::Validation(
                "game.board_height must be > 0".into(),
            ));
        }
        if self.board_width == 0 {
            return Err(ConfigError::Validation(
                "game.board_width must be > 0".into(),
            ));
        }
        if self.win_length == 0 {
            return Err(ConfigError::Validation(
                "game.win_length must be > 0".into(),
            ));
        }
        if self.win_length > self.board_height.max(self.board_width) {
            return Err(ConfigError::Validation(
                "game.win_length must fit on the board".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Terminal columns per board cell
    pub cell_width: u16,
    /// Input poll timeout per frame, in milliseconds
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            cell_width: 3,
            tick_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `drop_four=debug`. `RUST_LOG` wins.
    pub level: String,
    /// Log destination. The terminal belongs to the UI, so without a file
    /// nothing is logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!("Warning: config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;

        if self.ui.cell_width == 0 {
            return Err(ConfigError::Validation(
                "ui.cell_width must be > 0".into(),
            ));
        }
        if tracing_subscriber::EnvFilter::try_new(&self.log.level).is_err() {
            return Err(ConfigError::Validation(format!(
                "log.level '{}' is not a valid filter",
                self.log.level
            )));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
