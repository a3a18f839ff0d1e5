use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::lines::{self, ConfigLines, IMAGE_KEY, MAX_HEIGHT_KEY, MAX_WIDTH_KEY};
use crate::fit::Bounds;

pub const CONFIG_FILE: &str = "config.txt";

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_MAX_HEIGHT: u32 = 1080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{key} must be a positive integer, found {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// The persisted user settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Last displayed image, if any
    pub image_path: Option<PathBuf>,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_path: None,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

impl Settings {
    /// Builds settings from the recognized entries of a config file.
    ///
    /// Keys that appear more than once take their last value.
    pub fn from_lines(lines: &ConfigLines) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        for (key, value) in lines.entries() {
            match key {
                IMAGE_KEY => {
                    settings.image_path = (!value.is_empty()).then(|| PathBuf::from(value));
                }
                MAX_WIDTH_KEY => settings.max_width = parse_dimension(key, value)?,
                MAX_HEIGHT_KEY => settings.max_height = parse_dimension(key, value)?,
                _ => {}
            }
        }

        Ok(settings)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::saturating(self.max_width, self.max_height)
    }
}

fn parse_dimension(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_owned(),
        }),
    }
}

/// Reads and writes [`Settings`] in the line-oriented `Key=Value` format.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(CONFIG_FILE)
    }
}

impl ConfigStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file content as lines. A missing file reads as empty.
    pub fn read_lines(&self) -> Result<ConfigLines, ConfigError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(ConfigLines::parse(&content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Config file not found at {:?}, using defaults", self.path);
                Ok(ConfigLines::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Load settings, falling back to defaults for a missing file or keys.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let lines = self.read_lines()?;
        let settings = Settings::from_lines(&lines)?;
        tracing::info!("Loaded config from {:?}", self.path);
        Ok(settings)
    }

    /// Merge `settings` into the file as it currently exists on disk.
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let previous = self.read_lines()?;
        self.save_merged(settings, &previous)
    }

    /// Merge `settings` into `previous` and write the result.
    pub fn save_merged(&self, settings: &Settings, previous: &ConfigLines) -> Result<(), ConfigError> {
        let merged = lines::merge(previous, settings);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&self.path, merged.render()).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!("Saved config to {:?}", self.path);
        Ok(())
    }
}
