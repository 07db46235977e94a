//! Line-oriented console standing in for the pipeline window.
//!
//! Commands are read from stdin while events from the controller are rendered
//! as they arrive; both are handled on this one task.

use crate::display::Display;
use scriptlib::{Error, Registry, RunController, RunState, Settings};
use std::str::FromStr;
use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    select,
};

#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start(String),
    Cancel,
    Status,
    List,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = match (words.next(), words.next()) {
            (Some("start"), Some(script)) => Self::Start(script.to_string()),
            (Some("start"), None) => return Err("usage: start <script>".into()),
            (Some("cancel"), None) => Self::Cancel,
            (Some("status"), None) => Self::Status,
            (Some("list"), None) => Self::List,
            (Some("quit" | "exit"), None) => Self::Quit,
            _ => return Err(format!("unknown command: {}", s.trim())),
        };
        if words.next().is_some() {
            return Err(format!("too many arguments: {}", s.trim()));
        }
        Ok(command)
    }
}

pub fn print_scripts(registry: &Registry) {
    for job in registry.iter() {
        println!("{:<34} {:<7} {}", job.id, job.kind, job.name);
    }
}

pub async fn run(registry: Registry, settings: Settings) -> anyhow::Result<()> {
    let (controller, mut ui) = RunController::spawn(registry.clone(), settings);
    let mut display = Display::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();

    eprintln!("commands: start <script>, cancel, status, list, quit");
    loop {
        select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Start(script)) => match controller.start(script).await {
                        Ok(_) => {}
                        Err(err @ (Error::UnknownScript(_) | Error::AlreadyRunning)) => eprintln!("{}", err),
                        Err(err) => return Err(err.into()),
                    },
                    Ok(ConsoleCommand::Cancel) => controller.cancel().await?,
                    Ok(ConsoleCommand::Status) => match controller.state().await? {
                        RunState::Idle => eprintln!("idle"),
                        RunState::Running { script, cancelling, .. } => {
                            let suffix = if cancelling { " (cancelling)" } else { "" };
                            eprintln!("running {}{}", script, suffix);
                        }
                    },
                    Ok(ConsoleCommand::List) => print_scripts(&registry),
                    Ok(ConsoleCommand::Quit) => break,
                    Err(msg) => eprintln!("{}", msg),
                }
            }
            Some(event) = ui.recv() => display.show(&event)?,
        }
    }

    // see a running session through so its log block gets a footer
    if controller.state().await? != RunState::Idle {
        controller.cancel().await?;
        drop(controller);
        while let Some(event) = ui.recv().await {
            display.show(&event)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands() {
        let parse = |s: &str| s.parse::<ConsoleCommand>();
        assert_eq!(
            parse("start 8_AUGUSTUS.py"),
            Ok(ConsoleCommand::Start("8_AUGUSTUS.py".into()))
        );
        assert_eq!(parse("  cancel "), Ok(ConsoleCommand::Cancel));
        assert_eq!(parse("status"), Ok(ConsoleCommand::Status));
        assert_eq!(parse("list"), Ok(ConsoleCommand::List));
        assert_eq!(parse("exit"), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn reject_bad_commands() {
        assert!("start".parse::<ConsoleCommand>().is_err());
        assert!("start a b".parse::<ConsoleCommand>().is_err());
        assert!("cancel now".parse::<ConsoleCommand>().is_err());
        assert!("run 1_EXT_SPECIES.py".parse::<ConsoleCommand>().is_err());
    }
}
