use crate::types::{OutputBlob, SessionId};
use chrono::{DateTime, Local};
use std::{fmt, process::ExitStatus, time::Duration};

/// Why a session ended unsuccessfully.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    /// The child exited with a non-zero code.
    ExitCode(i32),
    /// The child was killed by a signal and has no exit code.
    Signal(i32),
    /// The child could not be started at all.
    Spawn(String),
    /// The child started but its exit status could not be collected.
    Wait(String),
}

/// Events produced by the runner for one session, in production order.
///
/// `Line` carries the bytes of one read, untouched; they need not end on a line
/// boundary or even on a character boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputEvent {
    Started {
        session: SessionId,
        command: String,
        script: String,
        timestamp: DateTime<Local>,
    },
    Line {
        data: OutputBlob,
    },
    Completed {
        exit_code: i32,
        duration: Duration,
    },
    Failed {
        failure: Failure,
        duration: Duration,
    },
    Cancelled {
        duration: Duration,
    },
}

impl OutputEvent {
    /// Terminal events end a session; nothing follows them.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }

    /// Whole seconds the session took, for terminal events.
    pub fn duration_seconds(&self) -> Option<u64> {
        match self {
            Self::Completed { duration, .. }
            | Self::Failed { duration, .. }
            | Self::Cancelled { duration } => Some(duration.as_secs()),
            Self::Started { .. } | Self::Line { .. } => None,
        }
    }
}

/// How a session ended. Displays as the tag written in the log footer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(Failure),
    Cancelled,
}

impl Outcome {
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => Self::Success,
            Some(code) => Self::Failed(Failure::ExitCode(code)),
            None => Self::Failed(signal_failure(status)),
        }
    }

    pub fn into_event(self, duration: Duration) -> OutputEvent {
        match self {
            Self::Success => OutputEvent::Completed {
                exit_code: 0,
                duration,
            },
            Self::Failed(failure) => OutputEvent::Failed { failure, duration },
            Self::Cancelled => OutputEvent::Cancelled { duration },
        }
    }
}

#[cfg(unix)]
fn signal_failure(status: ExitStatus) -> Failure {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => Failure::Signal(signal),
        None => Failure::Wait(format!("no exit code in {}", status)),
    }
}

#[cfg(not(unix))]
fn signal_failure(status: ExitStatus) -> Failure {
    Failure::Wait(format!("no exit code in {}", status))
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed(Failure::ExitCode(code)) => write!(f, "error:{}", code),
            Self::Failed(Failure::Signal(signal)) => write!(f, "error:signal:{}", signal),
            Self::Failed(Failure::Spawn(reason)) => write!(f, "error:spawn ({})", reason),
            Self::Failed(Failure::Wait(reason)) => write!(f, "error:wait ({})", reason),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Enabled state of the start and cancel actions, plus the status label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Controls {
    pub start_enabled: bool,
    pub cancel_enabled: bool,
    pub status: String,
}

impl Controls {
    pub fn idle() -> Self {
        Self {
            start_enabled: true,
            cancel_enabled: false,
            status: "Idle".into(),
        }
    }

    pub fn running(script: &str) -> Self {
        Self {
            start_enabled: false,
            cancel_enabled: true,
            status: format!("Running: {}", script),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// A session was accepted; the display buffer should be cleared.
    Starting,
    /// Cancellation was requested for the running session.
    Cancelling,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "Starting process..."),
            Self::Cancelling => write!(f, "*** Cancelling process... ***"),
        }
    }
}

/// Everything the UI consumer receives, in delivery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Output(OutputEvent),
    Controls(Controls),
    Notice(Notice),
}
