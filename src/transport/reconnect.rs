//! Reconnect Timer
//!
//! Single-slot reconnect scheduling. Every [`schedule`](ReconnectTimer::schedule)
//! supersedes the previous one, so at most one reconnect is ever pending.
//! Drivers start a platform timer carrying the returned ticket and, when it
//! fires, hand the ticket back; superseded or cancelled tickets are refused.

use std::time::Duration;

/// Default delay before reconnecting after an unexpected close
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Handle of one scheduled reconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectTicket {
    pub generation: u64,
    pub delay: Duration,
}

/// One pending reconnect at a time
#[derive(Debug)]
pub struct ReconnectTimer {
    delay: Duration,
    generation: u64,
    pending: Option<u64>,
}

impl ReconnectTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a reconnect, cancelling any pending one first
    pub fn schedule(&mut self) -> ReconnectTicket {
        self.generation += 1;
        self.pending = Some(self.generation);
        ReconnectTicket {
            generation: self.generation,
            delay: self.delay,
        }
    }

    /// Cancel the pending reconnect, if any
    ///
    /// Returns `true` when something was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Consume a fired ticket
    ///
    /// Returns `true` only for the currently pending ticket.
    pub fn fire(&mut self, ticket: ReconnectTicket) -> bool {
        if self.pending == Some(ticket.generation) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for ReconnectTimer {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_DELAY)
    }
}
