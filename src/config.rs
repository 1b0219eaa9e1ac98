use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{write_atomically, PlanError, Result};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory where exports land when no output path is given
    pub export_dir: PathBuf,

    /// File name prefix of default exports
    pub export_prefix: String,

    /// Default editor command
    pub editor_command: Option<String>,

    /// Whether to ask before destructive actions (delete, import)
    pub confirm_destructive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("."),
            export_prefix: "linkedin-posts".to_string(),
            editor_command: None,
            confirm_destructive: true,
        }
    }
}

impl Config {
    /// Location of the configuration file in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ideaboard").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads configuration from `path`, or from the default location.
    ///
    /// An explicitly given path must exist; a missing default file yields
    /// the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let text = fs::read_to_string(&path).map_err(|e| PlanError::ConfigError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        let config = serde_json::from_str(&text).map_err(|e| PlanError::ConfigError {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomically(path, json.as_bytes())?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Applies a `key=value` assignment
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| PlanError::ConfigError {
                message: format!("Expected key=value, got '{}'", assignment),
            })?;
        let value = value.trim();

        match key.trim() {
            "export_dir" => self.export_dir = PathBuf::from(value),
            "export_prefix" => {
                if value.is_empty() {
                    return Err(PlanError::ConfigError {
                        message: "export_prefix cannot be empty".to_string(),
                    });
                }
                self.export_prefix = value.to_string();
            }
            "editor_command" => {
                self.editor_command = (!value.is_empty()).then(|| value.to_string())
            }
            "confirm_destructive" => {
                self.confirm_destructive = value.parse().map_err(|_| PlanError::ConfigError {
                    message: format!("confirm_destructive expects true or false, got '{}'", value),
                })?
            }
            other => {
                return Err(PlanError::ConfigError {
                    message: format!("Unknown configuration key: {}", other),
                })
            }
        }

        Ok(())
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}
