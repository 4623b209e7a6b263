//! Configuration file parsing for `goloop.toml`.
//!
//! Searches current directory then ancestors, falling back to
//! `~/.config/goloop/goloop.toml` if no project-level file is found.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "goloop.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid toml in '{path}': {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid build_flags: {0}")]
    BuildFlags(#[from] shell_words::ParseError),
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct GoloopConfig {
    #[serde(default)]
    pub toolchain: ToolchainSection,
    #[serde(default)]
    pub session: SessionSection,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ToolchainSection {
    /// Go driver, looked up on PATH unless absolute
    pub go: String,
    /// Extra `go build` flags, split like a shell would
    pub build_flags: String,
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self { go: "go".to_string(), build_flags: String::new() }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SessionSection {
    /// Base name of the staging source, binary and capture files
    pub image: String,
    pub staging_dir: PathBuf,
    /// Keep the generated source after each build
    pub keep_source: bool,
    /// Persist line-editing history between sessions
    pub history: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            image: "goloop_image".to_string(),
            staging_dir: PathBuf::from("."),
            keep_source: false,
            history: true,
        }
    }
}

impl GoloopConfig {
    /// Load config from `goloop.toml`, searching current dir then parents.
    /// Returns `Default` when no file is found.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Locate the config file that `load` would read.
    pub fn find() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                break;
            }
        }
        let global = dirs::home_dir()?.join(".config").join("goloop").join(CONFIG_FILE);
        global.exists().then_some(global)
    }

    pub fn build_flags(&self) -> Result<Vec<String>, ConfigError> {
        Ok(shell_words::split(&self.toolchain.build_flags)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
