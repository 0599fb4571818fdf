//! Settings file for the CLI: explorer settings plus a `log` section.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use chaingql_client::profiles;
use chaingql_core::Settings;

use crate::logging::LogConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliSettings {
    #[serde(flatten)]
    pub explorer: Settings,
    #[serde(default)]
    pub log: LogConfig,
}

impl CliSettings {
    /// Read `path`, or fall back to the built-in NCOG Earth Chain profiles.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self {
                explorer: profiles::default_settings(),
                log: LogConfig::default(),
            }),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file '{}'", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing settings file '{}'", path.display()))
    }
}
