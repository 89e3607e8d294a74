use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::style::MIN_FONT_SIZE_PX;
use crate::app::infrastructure::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Base font size (px) for runs without a `font-size` override.
    #[serde(default = "default_font_size")]
    pub default_font_size: u32,

    #[serde(default)]
    pub dark_mode: bool,

    /// Last directory used in an import/export dialog.
    #[serde(default)]
    pub last_open_directory: Option<String>,

    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,

    /// Maximum number of undo steps kept by the editor.
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// flexi_logger spec string, e.g. `"info"` or `"debug, fltk=warn"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_font_size() -> u32 {
    15
}

fn default_export_file_name() -> String {
    "editor-state.json".to_string()
}

fn default_history_depth() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_font_size: default_font_size(),
            dark_mode: false,
            last_open_directory: None,
            export_file_name: default_export_file_name(),
            history_depth: default_history_depth(),
            log_level: default_log_level(),
        }
    }
}

impl AppSettings {
    /// Load settings from disk, or create default if not exists
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        match fs::read_to_string(config_path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Failed to load settings: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(_) => {
                // File doesn't exist, use defaults
                let default = Self::default();
                // Try to save defaults for next time
                if let Err(e) = default.save_to(config_path) {
                    log::debug!("Could not write default settings: {}", e);
                }
                default
            }
        }
    }

    fn parse(contents: &str) -> Result<Self, AppError> {
        let settings: Self = serde_json::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.default_font_size <= MIN_FONT_SIZE_PX {
            return Err(AppError::Settings(format!(
                "default_font_size must be above {}px",
                MIN_FONT_SIZE_PX
            )));
        }
        if self.history_depth == 0 {
            return Err(AppError::Settings("history_depth must be at least 1".to_string()));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(AppError::Settings("export_file_name is empty".to_string()));
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::get_config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), AppError> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(config_path, json)?;

        Ok(())
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("chartpad");
        path.push("settings.json");
        path
    }

    /// Directory for rotated log files.
    pub fn log_dir() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("chartpad");
        path.push("logs");
        path
    }
}
