//! Hand-off of events from the worker to the UI consumer.
//!
//! The worker pushes `OutputEvent`s into an unbounded per-session channel, so it
//! never waits on the UI. The controller task drains that channel on its own
//! turn and passes each event, together with its own control updates, to the
//! consumer through a `Marshaller`. Both hops are FIFO, so the consumer sees
//! events exactly once and in production order.

use crate::events::{Controls, Notice, OutputEvent, UiEvent};
use tokio::sync::mpsc;
use tracing::trace;

/// Where the runner puts the events it produces.
pub trait EventSink {
    fn emit(&mut self, event: OutputEvent);
}

impl EventSink for mpsc::UnboundedSender<OutputEvent> {
    fn emit(&mut self, event: OutputEvent) {
        // the controller only drops its receiver after the terminal event
        let _ = self.send(event);
    }
}

impl EventSink for Vec<OutputEvent> {
    fn emit(&mut self, event: OutputEvent) {
        self.push(event);
    }
}

pub type SessionEvents = mpsc::UnboundedReceiver<OutputEvent>;

/// A fresh channel for one session's events.
pub fn session_channel() -> (mpsc::UnboundedSender<OutputEvent>, SessionEvents) {
    mpsc::unbounded_channel()
}

/// Controller side of the hand-off to the UI consumer.
pub struct Marshaller {
    ui: mpsc::UnboundedSender<UiEvent>,
}

impl Marshaller {
    pub fn new(ui: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self { ui }
    }

    pub fn output(&self, event: OutputEvent) {
        self.deliver(UiEvent::Output(event));
    }

    pub fn controls(&self, controls: Controls) {
        self.deliver(UiEvent::Controls(controls));
    }

    pub fn notice(&self, notice: Notice) {
        self.deliver(UiEvent::Notice(notice));
    }

    fn deliver(&self, event: UiEvent) {
        if self.ui.send(event).is_err() {
            trace!("ui consumer gone, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_order() {
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let marshaller = Marshaller::new(ui_tx);
        marshaller.notice(Notice::Starting);
        marshaller.output(OutputEvent::Line { data: "a".into() });
        marshaller.output(OutputEvent::Line { data: "b".into() });
        marshaller.controls(Controls::idle());

        assert_eq!(ui_rx.try_recv().unwrap(), UiEvent::Notice(Notice::Starting));
        assert_eq!(
            ui_rx.try_recv().unwrap(),
            UiEvent::Output(OutputEvent::Line { data: "a".into() })
        );
        assert_eq!(
            ui_rx.try_recv().unwrap(),
            UiEvent::Output(OutputEvent::Line { data: "b".into() })
        );
        assert_eq!(ui_rx.try_recv().unwrap(), UiEvent::Controls(Controls::idle()));
        assert!(ui_rx.try_recv().is_err());
    }

    #[test]
    fn consumer_gone_is_not_an_error() {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        drop(ui_rx);
        Marshaller::new(ui_tx).notice(Notice::Cancelling);

        let (mut events, receiver) = session_channel();
        drop(receiver);
        events.emit(OutputEvent::Line { data: "late".into() });
    }
}
