mod arg_parser;
mod console;
mod display;

use arg_parser::{ArgParser, SubCommand};
use display::Display;
use scriptlib::{command, OutputEvent, Registry, RunController, Settings, UiEvent};

use clap::Parser;
use std::process::ExitCode;
use tokio::select;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipeline=info,scriptlib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = ArgParser::parse();
    let settings = args.settings()?;
    let registry = Registry::from_settings(&settings)?;
    debug!(config = ?args.config, ?settings, scripts = registry.len(), "settings loaded");

    match args.sub_command {
        SubCommand::List => console::print_scripts(&registry),
        SubCommand::Command { script } => {
            let job = registry.resolve(&script)?;
            println!("{}", command::build(&job, &settings));
        }
        SubCommand::Run { script } => return run(registry, settings, script).await,
        SubCommand::Shell => console::run(registry, settings).await?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Run a single script to its end. The first Ctrl-C cancels it, a second one gives up waiting.
async fn run(registry: Registry, settings: Settings, script: String) -> anyhow::Result<ExitCode> {
    let (controller, mut ui) = RunController::spawn(registry, settings);
    controller.start(script).await?;

    let mut display = Display::stdout();
    let mut cancelled = false;
    let mut succeeded = false;
    loop {
        select! {
            maybe_event = ui.recv() => {
                let Some(event) = maybe_event else { break };
                display.show(&event)?;
                if let UiEvent::Output(output) = &event {
                    if output.is_terminal() {
                        succeeded = matches!(output, OutputEvent::Completed { .. });
                        break;
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                if cancelled {
                    eprintln!("giving up on the running script");
                    return Ok(ExitCode::from(130));
                }
                cancelled = true;
                controller.cancel().await?;
            }
        }
    }

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
