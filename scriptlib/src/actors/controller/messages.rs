use super::RunState;
use crate::error;
use crate::types::{ScriptId, SessionId};
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum ControllerMessage {
    Start {
        script: ScriptId,
        response: oneshot::Sender<error::Result<SessionId>>,
    },
    Cancel {
        response: oneshot::Sender<()>,
    },
    GetState {
        response: oneshot::Sender<RunState>,
    },
}
