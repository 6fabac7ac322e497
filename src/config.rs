use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Error;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub document: DocumentConfig,
    pub copy: CopyConfig,
    pub answer: AnswerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DocumentConfig {
    pub standalone: bool,
    pub title: String,
    pub stylesheet: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            standalone: true,
            title: "Answer".to_string(),
            stylesheet: Some("https://cdn.tailwindcss.com".to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CopyConfig {
    pub reset_after_ms: u64,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            reset_after_ms: 2000,
        }
    }
}

impl CopyConfig {
    pub fn reset_after(&self) -> Duration {
        Duration::from_millis(self.reset_after_ms)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnswerConfig {
    pub placeholder: String,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            placeholder: "No answer yet.".to_string(),
        }
    }
}

impl Config {
    /// The config bundled with the crate (validated by the build script).
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file. A missing file gives the compiled
    /// default; an unreadable or malformed one is logged and also falls
    /// back to the default.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(Error::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Self::compiled_default()
            }
            Err(err) => {
                warn!(error = %err, "ignoring config file");
                Self::compiled_default()
            }
        }
    }

    /// Load config from a TOML file, reporting any failure.
    pub fn try_load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
