//! The table of runnable scripts.

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::types::ScriptId;
use std::{
    collections::HashSet,
    ffi::OsStr,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

/// How a script gets launched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpreterKind {
    /// Python script run inside an activated environment.
    PythonEnv,
    /// Script handed straight to the shell.
    ShellScript,
}

impl InterpreterKind {
    /// Infer the kind from the script's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(OsStr::to_str) {
            Some("py") => Some(Self::PythonEnv),
            Some("sh") => Some(Self::ShellScript),
            _ => None,
        }
    }
}

impl fmt::Display for InterpreterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PythonEnv => write!(f, "python"),
            Self::ShellScript => write!(f, "shell"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobDescriptor {
    pub id: ScriptId,
    pub kind: InterpreterKind,
    /// Relative to the configured scripts directory.
    pub path: PathBuf,
    pub name: String,
}

const BUILTIN: &[(&str, InterpreterKind, &str)] = &[
    ("1_EXT_SPECIES.py", InterpreterKind::PythonEnv, "1. EXT Species (Python)"),
    ("2_GENOMES_DOWNLOAD.py", InterpreterKind::PythonEnv, "2. Genomes Download (Python)"),
    ("3_GENOMES_UNZIP.sh", InterpreterKind::ShellScript, "3. Genomes Unzip (Bash)"),
    ("4_GENOMES_MOVE.sh", InterpreterKind::ShellScript, "4. Genomes Move (Bash)"),
    ("5a_GENOMES_MAKEDB_INDIVIDUAL.sh", InterpreterKind::ShellScript, "5a. MakeDB Individual (Bash)"),
    ("5b_GENOMES_MAKEDB_MODEL.sh", InterpreterKind::ShellScript, "5b. MakeDB Manual (Bash)"),
    ("6_SEQUENCES_SPLIT.sh", InterpreterKind::ShellScript, "6. Sequences Split (Bash)"),
    ("7_SEQUENCES_TBLASTN.sh", InterpreterKind::ShellScript, "7. TBLASTN (Bash)"),
    ("8_AUGUSTUS.py", InterpreterKind::PythonEnv, "8. AUGUSTUS (Python)"),
    ("9_EXONERATE.py", InterpreterKind::PythonEnv, "9. EXONERATE (Python)"),
    ("10_SCHEMA.py", InterpreterKind::PythonEnv, "10. Chromosome Schema (Python)"),
];

/// Immutable script table, built once at startup.
///
/// Descriptors are handed out as `Arc`s so a running session can hold on to its
/// job without borrowing the registry.
#[derive(Clone, Debug)]
pub struct Registry {
    jobs: Vec<Arc<JobDescriptor>>,
}

impl Registry {
    /// The eleven steps of the gene structure pipeline.
    pub fn builtin() -> Self {
        let jobs = BUILTIN
            .iter()
            .map(|(file, kind, name)| {
                Arc::new(JobDescriptor {
                    id: file.to_string(),
                    kind: *kind,
                    path: PathBuf::from(file),
                    name: name.to_string(),
                })
            })
            .collect();
        Self { jobs }
    }

    /// Use the `[[scripts]]` table from `settings`, or the builtin table if there is none.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        if settings.scripts.is_empty() {
            return Ok(Self::builtin());
        }
        let mut seen = HashSet::new();
        let mut jobs = Vec::with_capacity(settings.scripts.len());
        for entry in &settings.scripts {
            let path = PathBuf::from(&entry.file);
            let kind = InterpreterKind::from_path(&path).ok_or_else(|| {
                Error::Config(format!(
                    "{}: scripts must end in .py or .sh",
                    entry.file
                ))
            })?;
            if !seen.insert(entry.file.as_str()) {
                return Err(Error::Config(format!("{}: listed twice", entry.file)));
            }
            jobs.push(Arc::new(JobDescriptor {
                id: entry.file.clone(),
                kind,
                path,
                name: entry.name.clone(),
            }));
        }
        Ok(Self { jobs })
    }

    pub fn resolve(&self, script: &str) -> Result<Arc<JobDescriptor>> {
        self.jobs
            .iter()
            .find(|job| job.id == script)
            .cloned()
            .ok_or_else(|| Error::UnknownScript(script.to_string()))
    }

    /// Descriptors in display order.
    pub fn iter(&self) -> impl Iterator<Item = &JobDescriptor> {
        self.jobs.iter().map(|job| &**job)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ScriptEntry;
    use assert_matches::assert_matches;

    fn entry(file: &str, name: &str) -> ScriptEntry {
        ScriptEntry {
            file: file.into(),
            name: name.into(),
        }
    }

    #[test]
    fn builtin_table() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), 11);
        let ids: Vec<_> = registry.iter().map(|job| job.id.as_str()).collect();
        assert_eq!(ids.first(), Some(&"1_EXT_SPECIES.py"));
        assert_eq!(ids.last(), Some(&"10_SCHEMA.py"));

        let unzip = registry.resolve("3_GENOMES_UNZIP.sh").expect("builtin script");
        assert_eq!(unzip.kind, InterpreterKind::ShellScript);
        assert_eq!(unzip.name, "3. Genomes Unzip (Bash)");
        assert_eq!(
            registry.resolve("8_AUGUSTUS.py").expect("builtin script").kind,
            InterpreterKind::PythonEnv
        );
    }

    #[test]
    fn builtin_kinds_match_extensions() {
        for job in Registry::builtin().iter() {
            assert_eq!(InterpreterKind::from_path(&job.path), Some(job.kind), "{}", job.id);
        }
    }

    #[test]
    fn unknown_script() {
        let result = Registry::builtin().resolve("X");
        assert_matches!(result, Err(Error::UnknownScript(id)) if id == "X");
    }

    #[test]
    fn configured_scripts_replace_builtin() {
        let settings = Settings {
            scripts: vec![entry("clean.sh", "Clean up"), entry("plot.py", "Plot")],
            ..Settings::default()
        };
        let registry = Registry::from_settings(&settings).expect("valid scripts");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("plot.py").expect("plot").kind, InterpreterKind::PythonEnv);
        assert_matches!(registry.resolve("1_EXT_SPECIES.py"), Err(Error::UnknownScript(_)));
    }

    #[test]
    fn no_configured_scripts_means_builtin() {
        let registry = Registry::from_settings(&Settings::default()).expect("builtin");
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn rejects_bad_script_tables() {
        let settings = Settings {
            scripts: vec![entry("notes.txt", "Notes")],
            ..Settings::default()
        };
        assert_matches!(Registry::from_settings(&settings), Err(Error::Config(_)));

        let settings = Settings {
            scripts: vec![entry("a.sh", "A"), entry("a.sh", "A again")],
            ..Settings::default()
        };
        assert_matches!(Registry::from_settings(&settings), Err(Error::Config(_)));
    }
}
