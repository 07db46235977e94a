//! Turns a job descriptor into the concrete command line that runs it.

use crate::registry::{InterpreterKind, JobDescriptor};
use crate::settings::Settings;
use crate::types::{Args, Program};
use std::{borrow::Cow, fmt};

/// A program and its arguments.
///
/// The `Display` form is the shell-quoted command line, as recorded in the
/// session log and in `Started` events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: Program,
    pub args: Args,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Build the invocation for `job`.
///
/// Python scripts run through an interactive shell so the environment
/// activation hook is loaded, with the interpreter unbuffered and stderr folded
/// into stdout. Shell scripts are handed to the shell directly; the runner
/// attaches both of the child's output streams to one pipe, so no redirection
/// is needed there.
pub fn build(job: &JobDescriptor, settings: &Settings) -> Invocation {
    let script = settings.scripts_dir.join(&job.path);
    let script = script.to_string_lossy();
    match job.kind {
        InterpreterKind::PythonEnv => Invocation {
            program: settings.shell.clone(),
            args: vec![
                "-i".into(),
                "-c".into(),
                format!(
                    "{} {} && {} -u {} 2>&1",
                    settings.activate,
                    quote(&settings.environment),
                    settings.python,
                    quote(&script)
                ),
            ],
        },
        InterpreterKind::ShellScript => Invocation {
            program: settings.shell.clone(),
            args: vec![script.into_owned()],
        },
    }
}

/// Single-quote `word` unless it is made only of characters the shell leaves alone.
fn quote(word: &str) -> Cow<'_, str> {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,+@%".contains(c));
    if plain {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use std::path::PathBuf;

    #[test]
    fn python_script() {
        let job = Registry::builtin().resolve("1_EXT_SPECIES.py").unwrap();
        let invocation = build(&job, &Settings::default());
        assert_eq!(invocation.program, "bash");
        assert_eq!(
            invocation.to_string(),
            "bash -i -c 'conda activate PTPP && python -u bin/1_EXT_SPECIES.py 2>&1'"
        );
    }

    #[test]
    fn shell_script() {
        let job = Registry::builtin().resolve("4_GENOMES_MOVE.sh").unwrap();
        let invocation = build(&job, &Settings::default());
        assert_eq!(invocation.args, vec!["bin/4_GENOMES_MOVE.sh".to_string()]);
        assert_eq!(invocation.to_string(), "bash bin/4_GENOMES_MOVE.sh");
    }

    #[test]
    fn follows_settings() {
        let settings = Settings {
            shell: "/bin/zsh".into(),
            python: "python3".into(),
            activate: "micromamba activate".into(),
            environment: "gene tools".into(),
            scripts_dir: PathBuf::from("/srv/my scripts"),
            ..Settings::default()
        };
        let job = Registry::builtin().resolve("9_EXONERATE.py").unwrap();
        let invocation = build(&job, &settings);
        assert_eq!(
            invocation.args[2],
            "micromamba activate 'gene tools' && python3 -u '/srv/my scripts/9_EXONERATE.py' 2>&1"
        );
    }

    #[test]
    fn quoting() {
        assert_eq!(quote("bin/a.sh"), "bin/a.sh");
        assert_eq!(quote(""), "''");
        assert_eq!(quote("a b"), "'a b'");
        assert_eq!(quote("it's"), r"'it'\''s'");
    }
}
