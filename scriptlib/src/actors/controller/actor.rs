use super::messages::ControllerMessage;
use super::RunState;
use crate::actors::worker::WorkerHandle;
use crate::cancel::CancelToken;
use crate::command;
use crate::error::{Error, Result};
use crate::events::{Controls, Notice, OutputEvent};
use crate::marshal::{self, Marshaller, SessionEvents};
use crate::registry::Registry;
use crate::session::RunSession;
use crate::settings::Settings;
use crate::types::{ScriptId, SessionId};

use futures::future::{Future, OptionFuture};
use std::sync::Arc;
use tokio::{select, sync::mpsc, task};
use tracing::{debug, error, info};

enum State {
    Idle,
    Running(Active),
}

struct Active {
    script: ScriptId,
    session: SessionId,
    cancel: CancelToken,
    cancelling: bool,
    events: SessionEvents,
}

/// Owns every piece of controller state. Runs as a single task, which is the
/// UI-affine context: all transitions and all deliveries to the consumer
/// happen here, one at a time.
pub struct RunController {
    inbox: mpsc::Receiver<ControllerMessage>,
    registry: Registry,
    settings: Arc<Settings>,
    marshaller: Marshaller,
    state: State,
    // the last session's worker, joined before the next one is created
    worker: Option<WorkerHandle>,
}

impl RunController {
    pub fn spawn(
        inbox: mpsc::Receiver<ControllerMessage>,
        registry: Registry,
        settings: Settings,
        marshaller: Marshaller,
    ) {
        let actor = Self {
            inbox,
            registry,
            settings: Arc::new(settings),
            marshaller,
            state: State::Idle,
            worker: None,
        };
        tokio::spawn(async move { actor.run().await });
    }

    async fn run(mut self) {
        loop {
            select! {
                maybe_msg = self.inbox.recv() => {
                    match maybe_msg {
                        Some(msg) => self.handle_message(msg),
                        // every handle dropped
                        None => break,
                    }
                }
                Some(maybe_event) = session_events(&mut self.state) => {
                    self.handle_event(maybe_event);
                }
            }
        }
        self.shutdown().await;
    }

    fn handle_message(&mut self, msg: ControllerMessage) {
        use ControllerMessage::*;
        match msg {
            Start { script, response } => {
                let _ = response.send(self.start(script));
            }
            Cancel { response } => {
                self.cancel();
                let _ = response.send(());
            }
            GetState { response } => {
                let _ = response.send(self.snapshot());
            }
        }
    }

    fn start(&mut self, script: ScriptId) -> Result<SessionId> {
        if let State::Running(active) = &self.state {
            debug!(requested = %script, running = %active.script, "rejecting start");
            return Err(Error::AlreadyRunning);
        }
        let job = self.registry.resolve(&script)?;
        let invocation = command::build(&job, &self.settings);

        // Idle means the previous session's terminal event has been handled and
        // its thread has nothing left to do but return, so this join is brief.
        if let Some(previous) = self.worker.take() {
            previous.join();
        }

        let cancel = CancelToken::new();
        let session = RunSession::new(Arc::clone(&job), invocation, cancel.clone());
        let session_id = session.id;
        let (events_tx, events) = marshal::session_channel();
        self.worker = Some(WorkerHandle::spawn(
            session,
            Arc::clone(&self.settings),
            events_tx,
        )?);

        info!(session = %session_id, %script, "session started");
        self.state = State::Running(Active {
            script,
            session: session_id,
            cancel,
            cancelling: false,
            events,
        });
        self.marshaller.notice(Notice::Starting);
        self.marshaller.controls(Controls::running(&job.name));
        Ok(session_id)
    }

    fn cancel(&mut self) {
        if let State::Running(active) = &mut self.state {
            active.cancel.cancel();
            if !active.cancelling {
                info!(session = %active.session, "cancelling session");
                active.cancelling = true;
                self.marshaller.notice(Notice::Cancelling);
            }
        }
    }

    fn handle_event(&mut self, maybe_event: Option<OutputEvent>) {
        match maybe_event {
            Some(event) => {
                let terminal = event.is_terminal();
                self.marshaller.output(event);
                if terminal {
                    self.finish();
                }
            }
            None => {
                error!("script worker exited without reporting an outcome");
                self.finish();
            }
        }
    }

    /// Back to idle, whatever the outcome.
    fn finish(&mut self) {
        if let State::Running(active) = &self.state {
            debug!(session = %active.session, "session over");
        }
        self.state = State::Idle;
        self.marshaller.controls(Controls::idle());
    }

    fn snapshot(&self) -> RunState {
        match &self.state {
            State::Idle => RunState::Idle,
            State::Running(active) => RunState::Running {
                script: active.script.clone(),
                session: active.session,
                cancelling: active.cancelling,
            },
        }
    }

    /// Cancel a running session and see it through to its terminal event.
    async fn shutdown(mut self) {
        if let State::Running(active) = &mut self.state {
            active.cancel.cancel();
            while let Some(event) = active.events.recv().await {
                let terminal = event.is_terminal();
                self.marshaller.output(event);
                if terminal {
                    break;
                }
            }
            self.state = State::Idle;
        }
        if let Some(worker) = self.worker.take() {
            // off the runtime threads, which may be shutting down
            if let Err(err) = task::spawn_blocking(move || worker.join()).await {
                error!(%err, "failed to join script worker");
            }
        }
    }
}

/// Next event of the running session; resolves to `None` right away when idle,
/// which disables the branch for that turn of the loop.
fn session_events(
    state: &mut State,
) -> OptionFuture<impl Future<Output = Option<OutputEvent>> + '_> {
    OptionFuture::from(match state {
        State::Running(active) => Some(active.events.recv()),
        State::Idle => None,
    })
}
