//! Scratch scripts and settings for tests.

use crate::registry::Registry;
use crate::settings::{ScriptEntry, Settings};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tempfile::TempDir;

/// A temporary scripts directory with its own log file, run through `sh`.
pub struct Fixture {
    dir: TempDir,
    pub settings: Settings,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create scripts dir");
        let settings = Settings {
            shell: "sh".into(),
            scripts_dir: dir.path().to_path_buf(),
            log_file: dir.path().join("log.txt"),
            poll_interval: Duration::from_millis(1),
            ..Settings::default()
        };
        Self { dir, settings }
    }

    /// Add a script named `file`; its display name is `"<file> script"`.
    pub fn script(mut self, file: &str, body: &str) -> Self {
        std::fs::write(self.dir.path().join(file), body).expect("write script");
        self.settings.scripts.push(ScriptEntry {
            file: file.into(),
            name: format!("{} script", file),
        });
        self
    }

    pub fn registry(&self) -> Registry {
        Registry::from_settings(&self.settings).expect("fixture registry")
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn log_path(&self) -> PathBuf {
        self.settings.log_file.clone()
    }

    /// Contents of the session log, empty if nothing was written yet.
    pub fn log(&self) -> String {
        std::fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    /// The session log as raw bytes, for output that is not UTF-8.
    pub fn log_bytes(&self) -> Vec<u8> {
        std::fs::read(self.log_path()).unwrap_or_default()
    }
}
