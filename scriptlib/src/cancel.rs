use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Per-session cancellation flag.
///
/// The controller is the only writer; the worker polls it before every read.
/// A new token is created for every session, so a stale cancel can never leak
/// into the next one.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
