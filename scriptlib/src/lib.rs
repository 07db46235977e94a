//! Runs the scripts of a batch pipeline one at a time, streaming their output
//! to a UI consumer and to an append-only session log.

mod actors;
mod cancel;
pub mod command;
pub mod error;
pub mod events;
mod logfile;
mod marshal;
pub mod registry;
mod session;
pub mod settings;
#[cfg(test)]
mod testing;
pub mod types;

// re-export the controller handle as if it is the run controller itself.
pub use actors::controller::{RunControllerHandle as RunController, RunState};
pub use error::{Error, Result};
pub use events::{Controls, Failure, Notice, Outcome, OutputEvent, UiEvent};
pub use registry::{InterpreterKind, JobDescriptor, Registry};
pub use settings::Settings;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use std::time::Duration;

    #[tokio::test]
    async fn basic() {
        let fixture = Fixture::new().script("hello.sh", "printf 'hello '\nprintf 'world!' >&2\n");
        let (controller, mut ui) = RunController::spawn(fixture.registry(), fixture.settings.clone());
        controller.start("hello.sh").await.expect("start err");

        let mut output = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(10), ui.recv())
                .await
                .expect("timed out")
                .expect("controller exited");
            match event {
                UiEvent::Output(OutputEvent::Line { data }) => output.extend_from_slice(&data),
                UiEvent::Output(event) if event.is_terminal() => {
                    assert!(matches!(event, OutputEvent::Completed { exit_code: 0, .. }));
                    break;
                }
                _ => {}
            }
        }
        assert_eq!(output, b"hello world!");
    }
}
