//! Transport State Machine
//!
//! Platform-independent core of the socket wrapper. It decides when to open,
//! when to reconnect and what to do with each inbound frame; the drivers
//! (tokio natively, `web_sys::WebSocket` in the browser) own the actual
//! socket and timers and report back through these methods.
//!
//! ```text
//!             connect()              opened(a)
//!   Idle ───────────────▶ Connecting(a) ──────────▶ Open(a)
//!    ▲                        │  connect_failed(a)    │ closed(a) / errored(a)
//!    │ disconnect()           ▼                       ▼
//!    └──────────────────── Waiting ◀─────────────────┘
//!                             │ reconnect_due(ticket)
//!                             └──────▶ Connecting(a+1)
//! ```
//!
//! Every connection attempt carries a generation number. Callbacks from an
//! attempt that is no longer current are ignored, so a late close of an
//! abandoned socket can never schedule a second reconnect.

use std::time::Duration;

use super::coalesce::MoveCoalescer;
use super::reconnect::{ReconnectTicket, ReconnectTimer};
use super::registry::ConnectionStatus;
use crate::protocol::{ProtocolError, ServerEvent};

/// Identifies one connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectAttempt(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Connecting(ConnectAttempt),
    Open(ConnectAttempt),
    /// Lost or failed; a reconnect is scheduled
    Waiting,
}

/// What the driver should do with an inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Deliver to listeners now
    Dispatch(ServerEvent),
    /// A `pointerMoved` held for the next flush
    Coalesced {
        /// First move of the window: the driver must schedule a flush
        schedule_flush: bool,
    },
    /// Malformed or unknown; already logged
    Dropped(ProtocolError),
    /// Frame from a connection that is no longer current
    Stale,
}

/// Connection lifecycle, reconnect slot and move coalescing
#[derive(Debug)]
pub struct TransportCore {
    phase: Phase,
    attempts: u64,
    reconnect: ReconnectTimer,
    moves: MoveCoalescer,
}

impl TransportCore {
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            attempts: 0,
            reconnect: ReconnectTimer::new(reconnect_delay),
            moves: MoveCoalescer::new(),
        }
    }

    /// Status as shown to pages
    pub fn status(&self) -> ConnectionStatus {
        match self.phase {
            Phase::Idle => ConnectionStatus::Idle,
            Phase::Connecting(_) => ConnectionStatus::Connecting,
            Phase::Open(_) => ConnectionStatus::Connected,
            Phase::Waiting => ConnectionStatus::Disconnected,
        }
    }

    /// Total connection attempts started so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// The attempt that currently owns the socket, if any
    pub fn current_attempt(&self) -> Option<ConnectAttempt> {
        match self.phase {
            Phase::Connecting(a) | Phase::Open(a) => Some(a),
            Phase::Idle | Phase::Waiting => None,
        }
    }

    /// Request a connection
    ///
    /// Returns the attempt the driver must start, or `None` when a
    /// connection is already open or connecting. A pending reconnect is
    /// cancelled in favour of connecting now.
    pub fn connect(&mut self) -> Option<ConnectAttempt> {
        match self.phase {
            Phase::Connecting(_) | Phase::Open(_) => {
                tracing::debug!("Already connected or connecting");
                None
            }
            Phase::Idle | Phase::Waiting => {
                self.reconnect.cancel();
                self.attempts += 1;
                let attempt = ConnectAttempt(self.attempts);
                self.phase = Phase::Connecting(attempt);
                Some(attempt)
            }
        }
    }

    /// The socket of `attempt` opened
    pub fn opened(&mut self, attempt: ConnectAttempt) -> bool {
        if self.phase == Phase::Connecting(attempt) {
            self.phase = Phase::Open(attempt);
            true
        } else {
            false
        }
    }

    /// The socket of `attempt` could not be created or never opened
    pub fn connect_failed(&mut self, attempt: ConnectAttempt) -> Option<ReconnectTicket> {
        if self.phase == Phase::Connecting(attempt) {
            Some(self.lose())
        } else {
            None
        }
    }

    /// The socket of `attempt` closed
    ///
    /// Schedules exactly one reconnect unless the close was deliberate or
    /// the attempt is already stale.
    pub fn closed(&mut self, attempt: ConnectAttempt) -> Option<ReconnectTicket> {
        match self.phase {
            Phase::Connecting(a) | Phase::Open(a) if a == attempt => Some(self.lose()),
            _ => None,
        }
    }

    /// The socket of `attempt` reported an error
    ///
    /// Takes the same path as a close; the close that usually follows is
    /// then ignored.
    pub fn errored(&mut self, attempt: ConnectAttempt) -> Option<ReconnectTicket> {
        self.closed(attempt)
    }

    /// Deliberate close
    ///
    /// Cancels any pending reconnect and suppresses the automatic one.
    /// Returns the attempt whose socket the driver must close.
    pub fn disconnect(&mut self) -> Option<ConnectAttempt> {
        let current = self.current_attempt();
        if self.reconnect.cancel() {
            tracing::debug!("Pending reconnect cancelled");
        }
        self.moves.clear();
        self.phase = Phase::Idle;
        current
    }

    /// A reconnect timer fired
    ///
    /// Returns the attempt to start, or `None` for a superseded or
    /// cancelled ticket.
    pub fn reconnect_due(&mut self, ticket: ReconnectTicket) -> Option<ConnectAttempt> {
        if !self.reconnect.fire(ticket) || self.phase != Phase::Waiting {
            return None;
        }
        tracing::info!("Attempting to reconnect...");
        self.connect()
    }

    pub fn is_reconnect_pending(&self) -> bool {
        self.reconnect.is_pending()
    }

    /// Whether outbound frames can be sent right now
    pub fn can_send(&self) -> bool {
        matches!(self.phase, Phase::Open(_))
    }

    /// Classify an inbound text frame of `attempt`
    pub fn receive(&mut self, attempt: ConnectAttempt, text: &str) -> Inbound {
        if self.phase != Phase::Open(attempt) {
            return Inbound::Stale;
        }

        match ServerEvent::decode(text) {
            Ok(ServerEvent::PointerMoved(patch)) => Inbound::Coalesced {
                schedule_flush: self.moves.push(patch),
            },
            Ok(event) => {
                tracing::debug!(event = %event.kind(), "Received event");
                Inbound::Dispatch(event)
            }
            Err(ProtocolError::UnknownEvent(name)) => {
                tracing::warn!(event = %name, "Unknown event type");
                Inbound::Dropped(ProtocolError::UnknownEvent(name))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error parsing WebSocket message");
                Inbound::Dropped(e)
            }
        }
    }

    /// Close the flush window and return the coalesced moves as events
    pub fn flush(&mut self) -> Vec<ServerEvent> {
        self.moves
            .drain()
            .into_iter()
            .map(ServerEvent::PointerMoved)
            .collect()
    }

    fn lose(&mut self) -> ReconnectTicket {
        self.phase = Phase::Waiting;
        let ticket = self.reconnect.schedule();
        tracing::info!(delay_ms = ticket.delay.as_millis() as u64, "Reconnect scheduled");
        ticket
    }
}

impl Default for TransportCore {
    fn default() -> Self {
        Self::new(super::reconnect::DEFAULT_RECONNECT_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_core() -> (TransportCore, ConnectAttempt) {
        let mut core = TransportCore::default();
        let attempt = core.connect().unwrap();
        assert!(core.opened(attempt));
        (core, attempt)
    }

    const MOVE_A1: &str = r#"{"event":"pointerMoved","data":{"id":"a","latitude":1.0,"longitude":1.0}}"#;
    const MOVE_A2: &str = r#"{"event":"pointerMoved","data":{"id":"a","latitude":2.0,"longitude":2.0}}"#;

    #[test]
    fn test_duplicate_connect_is_noop() {
        let mut core = TransportCore::default();
        assert!(core.connect().is_some());
        assert_eq!(core.status(), ConnectionStatus::Connecting);
        assert!(core.connect().is_none());
        assert_eq!(core.attempts(), 1);

        let (mut core, _) = open_core();
        assert!(core.connect().is_none());
        assert_eq!(core.attempts(), 1);
        assert_eq!(core.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_unexpected_close_schedules_one_reconnect() {
        let (mut core, attempt) = open_core();
        let ticket = core.closed(attempt).unwrap();
        assert_eq!(ticket.delay, Duration::from_secs(5));
        assert_eq!(core.status(), ConnectionStatus::Disconnected);
        assert!(core.closed(attempt).is_none());

        let next = core.reconnect_due(ticket).unwrap();
        assert_eq!(next, ConnectAttempt(2));
        assert!(core.reconnect_due(ticket).is_none());
    }

    #[test]
    fn test_error_then_close_schedules_once() {
        let (mut core, attempt) = open_core();
        assert!(core.errored(attempt).is_some());
        assert!(core.closed(attempt).is_none());
        assert!(core.is_reconnect_pending());
    }

    #[test]
    fn test_disconnect_cancels_pending_reconnect() {
        let (mut core, attempt) = open_core();
        let ticket = core.closed(attempt).unwrap();
        assert!(core.disconnect().is_none());
        assert!(!core.is_reconnect_pending());
        assert!(core.reconnect_due(ticket).is_none());
        assert_eq!(core.status(), ConnectionStatus::Idle);
    }

    #[test]
    fn test_deliberate_close_suppresses_reconnect() {
        let (mut core, attempt) = open_core();
        assert_eq!(core.disconnect(), Some(attempt));
        assert!(core.closed(attempt).is_none());
        assert!(!core.is_reconnect_pending());
    }

    #[test]
    fn test_connect_while_waiting_cancels_timer() {
        let (mut core, attempt) = open_core();
        let ticket = core.closed(attempt).unwrap();
        let now = core.connect().unwrap();
        assert_ne!(now, attempt);
        assert!(!core.is_reconnect_pending());
        assert!(core.reconnect_due(ticket).is_none());
    }

    #[test]
    fn test_failed_connect_takes_reconnect_path() {
        let mut core = TransportCore::new(Duration::from_millis(50));
        let attempt = core.connect().unwrap();
        let ticket = core.connect_failed(attempt).unwrap();
        assert_eq!(ticket.delay, Duration::from_millis(50));
        assert!(!core.opened(attempt));
    }

    #[test]
    fn test_stale_attempt_ignored() {
        let (mut core, first) = open_core();
        let ticket = core.closed(first).unwrap();
        let second = core.reconnect_due(ticket).unwrap();
        assert!(core.opened(second));

        assert!(core.closed(first).is_none());
        assert_eq!(core.receive(first, r#"{"event":"connected"}"#), Inbound::Stale);
        assert_eq!(core.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_send_only_when_open() {
        let mut core = TransportCore::default();
        assert!(!core.can_send());
        let attempt = core.connect().unwrap();
        assert!(!core.can_send());
        core.opened(attempt);
        assert!(core.can_send());
    }

    #[test]
    fn test_receive_coalesces_moves() {
        let (mut core, attempt) = open_core();
        assert_eq!(
            core.receive(attempt, MOVE_A1),
            Inbound::Coalesced {
                schedule_flush: true
            }
        );
        assert_eq!(
            core.receive(attempt, MOVE_A2),
            Inbound::Coalesced {
                schedule_flush: false
            }
        );

        let flushed = core.flush();
        assert_eq!(flushed.len(), 1);
        match &flushed[0] {
            ServerEvent::PointerMoved(p) => assert_eq!(p.latitude, Some(2.0)),
            other => panic!("Expected PointerMoved, got {:?}", other),
        }
    }

    #[test]
    fn test_receive_drops_bad_frames() {
        let (mut core, attempt) = open_core();
        assert!(matches!(
            core.receive(attempt, "{oops"),
            Inbound::Dropped(ProtocolError::MalformedJson(_))
        ));
        assert_eq!(
            core.receive(attempt, r#"{"event":"mystery"}"#),
            Inbound::Dropped(ProtocolError::UnknownEvent("mystery".into()))
        );
        assert_eq!(core.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_disconnect_discards_pending_moves() {
        let (mut core, attempt) = open_core();
        core.receive(attempt, MOVE_A1);
        core.disconnect();
        assert!(core.flush().is_empty());
    }
}
