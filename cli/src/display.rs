use scriptlib::{Failure, Notice, OutputEvent, UiEvent};
use std::{
    borrow::Cow,
    io::{self, Write},
};

/// Bytes appended to the output view for `event`, if any.
///
/// Output chunks are passed through untouched; they are not lines, and the
/// terminal puts back together a character split across two of them.
pub fn render(event: &UiEvent) -> Option<Cow<'_, [u8]>> {
    let text = match event {
        UiEvent::Notice(Notice::Starting) => format!("{}\n", Notice::Starting),
        UiEvent::Notice(Notice::Cancelling) => format!("\n{}\n", Notice::Cancelling),
        UiEvent::Controls(_) => return None,
        UiEvent::Output(OutputEvent::Started { command, .. }) => format!("Executing: {}\n\n", command),
        UiEvent::Output(OutputEvent::Line { data }) => return Some(Cow::Borrowed(&data[..])),
        UiEvent::Output(output) => summary(output)?,
    };
    Some(Cow::Owned(text.into_bytes()))
}

/// Closing banner for a terminal event.
fn summary(event: &OutputEvent) -> Option<String> {
    let outcome = match event {
        OutputEvent::Started { .. } | OutputEvent::Line { .. } => return None,
        OutputEvent::Completed { .. } => "Process completed successfully".to_string(),
        OutputEvent::Failed { failure, .. } => match failure {
            Failure::ExitCode(code) => format!("Process completed with errors (status: {})", code),
            Failure::Signal(signal) => format!("Process killed by signal {}", signal),
            Failure::Spawn(reason) => format!("Failed to start process: {}", reason),
            Failure::Wait(reason) => format!("Lost track of process: {}", reason),
        },
        OutputEvent::Cancelled { .. } => "Process was cancelled by user".to_string(),
    };
    Some(format!(
        "\n\n*** {} ***\nDuration: {}s\n",
        outcome,
        event.duration_seconds().unwrap_or_default()
    ))
}

/// Output view on stdout, status line on stderr.
pub struct Display<W: Write> {
    out: W,
}

impl Display<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> Display<W> {
    pub fn show(&mut self, event: &UiEvent) -> io::Result<()> {
        if let UiEvent::Controls(controls) = event {
            eprintln!("[{}]", controls.status);
            return Ok(());
        }
        if let Some(bytes) = render(event) {
            self.out.write_all(&bytes)?;
            self.out.flush()?;
        }
        Ok(())
    }
}
