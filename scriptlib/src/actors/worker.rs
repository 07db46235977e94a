pub mod runner;

use crate::events::OutputEvent;
use crate::session::RunSession;
use crate::settings::Settings;
use std::{io, sync::Arc, thread};
use tokio::sync::mpsc;
use tracing::error;

/// Handle to the thread running one session.
///
/// Every session gets a fresh OS thread so the runner may block on reads
/// without holding up the controller.
pub struct WorkerHandle {
    thread: thread::JoinHandle<()>,
}

impl WorkerHandle {
    pub fn spawn(
        session: RunSession,
        settings: Arc<Settings>,
        events: mpsc::UnboundedSender<OutputEvent>,
    ) -> io::Result<Self> {
        let thread = thread::Builder::new()
            .name("script-worker".into())
            .spawn(move || {
                let mut events = events;
                runner::run(session, &settings, &mut events);
            })?;
        Ok(Self { thread })
    }

    /// Wait for the thread to exit.
    ///
    /// Only called once the session's terminal event has been seen, at which
    /// point the thread is returning.
    pub fn join(self) {
        if self.thread.join().is_err() {
            error!("script worker panicked");
        }
    }
}
