use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use log::debug;

/// Input classes. Each class is debounced on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonEvent {
    RotateUp,
    RotateDown,
    FetchCurrent,
    FetchAll,
    Sleep,
}

impl ButtonEvent {
    pub const ALL: [ButtonEvent; 5] = [
        ButtonEvent::RotateUp,
        ButtonEvent::RotateDown,
        ButtonEvent::FetchCurrent,
        ButtonEvent::FetchAll,
        ButtonEvent::Sleep,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ButtonEvent::RotateUp => "UP",
            ButtonEvent::RotateDown => "DOWN",
            ButtonEvent::FetchCurrent => "FETCH",
            ButtonEvent::FetchAll => "FETCH_ALL",
            ButtonEvent::Sleep => "SLEEP",
        }
    }
}

/// A button press stamped with the uptime at which it was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Press {
    pub button: ButtonEvent,
    pub at_ms: u64,
}

impl Press {
    pub fn new(button: ButtonEvent, at_ms: u64) -> Self {
        Self { button, at_ms }
    }
}

/// Consumer side of the input queue. There is exactly one consumer.
pub trait EventQueue {
    /// Block until a press arrives. `None` once no producer is left.
    fn recv(&mut self) -> Option<Press>;

    fn try_recv(&mut self) -> Option<Press>;

    /// Discard everything queued so far. Returns how many were dropped.
    fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while let Some(p) = self.try_recv() {
            debug!("Drained stale {} press", p.button.as_str());
            dropped += 1;
        }
        dropped
    }
}

// ── Channel-backed queue ────────────────────────────────────────────

/// Producer handle. Never blocks: a full queue drops the press.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: SyncSender<Press>,
}

impl EventSender {
    pub fn send(&self, press: Press) -> bool {
        match self.tx.try_send(press) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Bounded queue over `std::sync::mpsc`.
#[derive(Debug)]
pub struct ChannelQueue {
    rx: Receiver<Press>,
}

impl ChannelQueue {
    pub fn bounded(depth: usize) -> (EventSender, ChannelQueue) {
        let (tx, rx) = mpsc::sync_channel(depth);
        (EventSender { tx }, ChannelQueue { rx })
    }
}

impl EventQueue for ChannelQueue {
    fn recv(&mut self) -> Option<Press> {
        self.rx.recv().ok()
    }

    fn try_recv(&mut self) -> Option<Press> {
        self.rx.try_recv().ok()
    }
}

// ── Debounce ────────────────────────────────────────────────────────

/// Per-class debounce: a press is dropped when the last accepted press of
/// the same class was less than `window_ms` earlier.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,
    last: [Option<u64>; ButtonEvent::ALL.len()],
}

impl Debouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last: [None; ButtonEvent::ALL.len()],
        }
    }

    pub fn accept(&mut self, press: Press) -> bool {
        let slot = &mut self.last[press.button.index()];
        if let Some(prev) = *slot {
            if press.at_ms.saturating_sub(prev) < self.window_ms {
                return false;
            }
        }
        *slot = Some(press.at_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_class_inside_window_is_dropped() {
        let mut d = Debouncer::new(200);
        assert!(d.accept(Press::new(ButtonEvent::RotateUp, 1000)));
        assert!(!d.accept(Press::new(ButtonEvent::RotateUp, 1199)));
        assert!(d.accept(Press::new(ButtonEvent::RotateUp, 1200)));
    }

    #[test]
    fn dropped_press_does_not_extend_window() {
        let mut d = Debouncer::new(200);
        assert!(d.accept(Press::new(ButtonEvent::FetchAll, 0)));
        assert!(!d.accept(Press::new(ButtonEvent::FetchAll, 150)));
        assert!(d.accept(Press::new(ButtonEvent::FetchAll, 210)));
    }

    #[test]
    fn classes_are_independent() {
        let mut d = Debouncer::new(200);
        assert!(d.accept(Press::new(ButtonEvent::RotateUp, 1000)));
        assert!(d.accept(Press::new(ButtonEvent::RotateDown, 1001)));
        assert!(d.accept(Press::new(ButtonEvent::FetchCurrent, 1002)));
        assert!(d.accept(Press::new(ButtonEvent::Sleep, 1003)));
    }

    #[test]
    fn first_press_at_zero_is_accepted() {
        let mut d = Debouncer::new(200);
        assert!(d.accept(Press::new(ButtonEvent::Sleep, 0)));
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (tx, mut rx) = ChannelQueue::bounded(2);
        assert!(tx.send(Press::new(ButtonEvent::RotateUp, 0)));
        assert!(tx.send(Press::new(ButtonEvent::RotateUp, 1)));
        assert!(!tx.send(Press::new(ButtonEvent::RotateUp, 2)));
        assert_eq!(rx.drain(), 2);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn recv_ends_when_producers_are_gone() {
        let (tx, mut rx) = ChannelQueue::bounded(4);
        tx.send(Press::new(ButtonEvent::FetchCurrent, 5));
        drop(tx);
        assert_eq!(rx.recv(), Some(Press::new(ButtonEvent::FetchCurrent, 5)));
        assert_eq!(rx.recv(), None);
    }
}
