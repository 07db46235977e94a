use clap::{Parser, Subcommand};
use scriptlib::{Result, Settings};
use std::path::PathBuf;

/// Run the gene structure pipeline scripts, one at a time
#[derive(Debug, Parser)]
#[command(name = "pipeline")]
pub struct ArgParser {
    /// TOML configuration file
    #[arg(short, long, env = "PIPELINE_CONFIG")]
    pub config: Option<PathBuf>,
    /// Append session logs to this file instead of the configured one
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Directory holding the scripts
    #[arg(long)]
    pub scripts_dir: Option<PathBuf>,
    /// The sub-command to use
    #[command(subcommand)]
    pub sub_command: SubCommand,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum SubCommand {
    /// list the available scripts
    List,
    /// print the command a script would run, without running it
    Command {
        /// script id, as shown by `list`
        script: String,
    },
    /// run a script and stream its output; Ctrl-C cancels
    Run {
        /// script id, as shown by `list`
        script: String,
    },
    /// interactive console: start, cancel and watch scripts
    Shell,
}

impl ArgParser {
    /// Settings from the config file, if any, with command line overrides applied.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        if let Some(log_file) = &self.log_file {
            settings.log_file = log_file.clone();
        }
        if let Some(scripts_dir) = &self.scripts_dir {
            settings.scripts_dir = scripts_dir.clone();
        }
        Ok(settings)
    }
}
