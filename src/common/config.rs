use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::common::collections::HashSet;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("workspace name must not be empty")]
    EmptyWorkspaceName,
    #[error("workspace name '{0}' is configured more than once")]
    DuplicateWorkspace(String),
    #[error("gaps must not be negative (inner {inner}, outer {outer})")]
    NegativeGap { inner: i32, outer: i32 },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub gaps: GapSettings,
    #[serde(default = "default_workspaces")]
    pub workspaces: Vec<WorkspaceConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    #[serde(default)]
    pub inner_gap: i32,
    #[serde(default)]
    pub outer_gap: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    pub name: String,
}

fn default_workspaces() -> Vec<WorkspaceConfig> {
    (1..=9).map(|i| WorkspaceConfig { name: i.to_string() }).collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gaps: GapSettings::default(),
            workspaces: default_workspaces(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trellis").join("config.toml"))
    }

    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = fs::read_to_string(path)?;
        let config = Self::parse(&buf)?;
        debug!(?path, workspaces = config.workspaces.len(), "Loaded config");
        Ok(config)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        config.validate()?;
        Ok(config)
    }

    /// Workspace names are unique from here on; activation does not re-check them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gaps.inner_gap < 0 || self.gaps.outer_gap < 0 {
            return Err(ConfigError::NegativeGap {
                inner: self.gaps.inner_gap,
                outer: self.gaps.outer_gap,
            });
        }
        let mut seen = HashSet::default();
        for ws in &self.workspaces {
            if ws.name.trim().is_empty() {
                return Err(ConfigError::EmptyWorkspaceName);
            }
            if !seen.insert(ws.name.as_str()) {
                return Err(ConfigError::DuplicateWorkspace(ws.name.clone()));
            }
        }
        Ok(())
    }
}
