//! Runtime configuration, loaded from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! same setup as the desktop pipeline: scripts under `bin/`, python scripts run
//! inside the `PTPP` conda environment, sessions appended to `log.txt`.

use crate::error::Result;
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Shell used to launch every script.
    pub shell: String,
    /// Interpreter for python scripts, resolved inside the activated environment.
    pub python: String,
    /// Command that activates an environment, followed by the environment name.
    pub activate: String,
    pub environment: String,
    /// Directory the script paths are relative to.
    pub scripts_dir: PathBuf,
    /// Working directory of the child. Defaults to the current directory.
    pub working_dir: Option<PathBuf>,
    /// Append-only session log.
    pub log_file: PathBuf,
    /// Delay between two reads of the child's output.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Replaces the builtin script table when not empty.
    pub scripts: Vec<ScriptEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptEntry {
    /// File name relative to `scripts_dir`; also the script id.
    pub file: String,
    /// Name shown to the user.
    pub name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shell: "bash".into(),
            python: "python".into(),
            activate: "conda activate".into(),
            environment: "PTPP".into(),
            scripts_dir: PathBuf::from("bin"),
            working_dir: None,
            log_file: PathBuf::from("log.txt"),
            poll_interval: Duration::from_millis(10),
            scripts: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        Ok(toml::from_str(value)?)
    }
}
