//! Configuration management
//!
//! Load and save user preferences to a TOML config file.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::artifact::SourceRetention;
use crate::inputs::OutputFormat;
use crate::service::DEFAULT_ENDPOINT;
use crate::session::SessionOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServicePreferences,
    pub session: SessionPreferences,
    pub export: ExportPreferences,
    pub ui: UiPreferences,
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {:?}", path))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Invalid config: {:?}", path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "uigen", "uigen") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("uigen.toml"))
        }
    }

    /// Copy of this config with command line values applied on top
    pub fn with_overrides(&self, overrides: &Overrides) -> Config {
        let mut config = self.clone();
        if let Some(ref endpoint) = overrides.endpoint {
            config.service.endpoint = endpoint.clone();
        }
        if let Some(ref font) = overrides.font {
            config.session.default_font = font.clone();
        }
        if let Some(format) = overrides.format {
            config.session.default_format = format;
        }
        if let Some(ref dir) = overrides.out_dir {
            config.export.directory = dir.clone();
        }
        config
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            default_font: self.session.default_font.clone(),
            default_format: self.session.default_format,
            retention: self.session.retention,
        }
    }
}

/// Values given on the command line for one run. Never written to disk.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub font: Option<String>,
    pub format: Option<OutputFormat>,
    pub out_dir: Option<PathBuf>,
}

/// A config file and the contents read from it
#[derive(Debug)]
pub struct ConfigFile {
    path: PathBuf,
    config: Config,
}

impl ConfigFile {
    /// Read `path`. A missing file yields defaults; an unreadable or
    /// unparseable one is an error and is left alone.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = Config::load_from(&path)?;
        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Write the file contents back to where they came from
    pub fn save(&self) -> Result<()> {
        self.config
            .save_to(&self.path)
            .with_context(|| format!("Failed to save config: {:?}", self.path))
    }
}

/// Generation service preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePreferences {
    pub endpoint: String,
    /// Unset means wait as long as the service takes
    pub request_timeout_secs: Option<u64>,
}

impl ServicePreferences {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl Default for ServicePreferences {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Input and artifact defaults for a new session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPreferences {
    pub default_font: String,
    pub default_format: OutputFormat,
    pub retention: SourceRetention,
}

impl Default for SessionPreferences {
    fn default() -> Self {
        let options = SessionOptions::default();
        Self {
            default_font: options.default_font,
            default_format: options.default_format,
            retention: options.retention,
        }
    }
}

/// Where downloads are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPreferences {
    pub directory: PathBuf,
}

impl Default for ExportPreferences {
    fn default() -> Self {
        let directory = directories::UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self { directory }
    }
}

/// UI preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    pub show_line_numbers: bool,
    pub word_wrap: bool,
}
