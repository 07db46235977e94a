use crate::cancel::CancelToken;
use crate::command::Invocation;
use crate::registry::JobDescriptor;
use crate::types::SessionId;
use chrono::{DateTime, Local};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// One execution of a script, from start to its terminal event.
///
/// Created by the controller and moved into the worker, which owns it until the
/// session ends.
pub struct RunSession {
    pub id: SessionId,
    pub job: Arc<JobDescriptor>,
    pub invocation: Invocation,
    pub cancel: CancelToken,
    pub started: DateTime<Local>,
    clock: Instant,
}

impl RunSession {
    pub fn new(job: Arc<JobDescriptor>, invocation: Invocation, cancel: CancelToken) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            job,
            invocation,
            cancel,
            started: Local::now(),
            clock: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }
}
