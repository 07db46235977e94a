mod actor;
mod messages;

use self::{
    actor::RunController,
    messages::ControllerMessage::{self, Cancel, GetState, Start},
};
use crate::error::{Error, Result};
use crate::events::UiEvent;
use crate::marshal::Marshaller;
use crate::registry::Registry;
use crate::settings::Settings;
use crate::types::{ScriptId, SessionId};
use tokio::sync::{mpsc, oneshot};

const MESSAGE_CAPACITY: usize = 32;

/// What the controller is doing right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running {
        script: ScriptId,
        session: SessionId,
        cancelling: bool,
    },
}

/// A `RunController` which lets at most one script run at a time.
///
/// This struct is an actor handle; the controller itself runs in the task spawned by
/// `RunControllerHandle::spawn` and owns all session state. Handles can be cloned
/// freely. Dropping the last one cancels a running session and stops the controller
/// once that session has ended.
#[derive(Clone)]
pub struct RunControllerHandle {
    sender: mpsc::Sender<ControllerMessage>,
}

impl RunControllerHandle {
    /// Spawn a new controller.
    ///
    /// Returns the handle together with the stream of events meant for the UI.
    pub fn spawn(registry: Registry, settings: Settings) -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (sender, inbox) = mpsc::channel(MESSAGE_CAPACITY);
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        RunController::spawn(inbox, registry, settings, Marshaller::new(ui_tx));
        (Self { sender }, ui_rx)
    }

    /// Start `script`.
    ///
    /// Fails with `UnknownScript` if the registry does not know it, and with
    /// `AlreadyRunning` while another session is active. Either way no session is
    /// created and no event is emitted.
    pub async fn start(&self, script: impl Into<ScriptId>) -> Result<SessionId> {
        let (tx, rx) = oneshot::channel();
        self.send(Start {
            script: script.into(),
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| Error::ControllerExited)?
    }

    /// Ask the running session to stop reading its output.
    ///
    /// Does nothing when idle. Returns as soon as the request is recorded; the
    /// session reports `Cancelled` once the worker notices.
    pub async fn cancel(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Cancel { response: tx }).await?;
        rx.await.map_err(|_| Error::ControllerExited)
    }

    pub async fn state(&self) -> Result<RunState> {
        let (tx, rx) = oneshot::channel();
        self.send(GetState { response: tx }).await?;
        rx.await.map_err(|_| Error::ControllerExited)
    }

    async fn send(&self, msg: ControllerMessage) -> Result<()> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| Error::ControllerExited)
    }
}
