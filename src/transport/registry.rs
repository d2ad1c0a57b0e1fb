//! Listener Registry
//!
//! Typed publish/subscribe surface of the transport. Consumers register a
//! listener per event kind (several per kind are fine) and get back a
//! [`Subscription`] token; dropping the token detaches the listener.
//!
//! Listeners are cloned out of the registry before they run, so a listener
//! may subscribe or unsubscribe from inside its own callback.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use super::lock;
use crate::protocol::{EventKind, ServerEvent};

/// Observable connection status of the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    /// Never connected, or deliberately disconnected
    Idle,
    /// A connection attempt is in flight
    Connecting,
    /// Socket is open
    Connected,
    /// Lost unexpectedly; a reconnect is scheduled
    Disconnected,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Idle => "Idle",
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

type EventListener = Arc<dyn Fn(&ServerEvent) + Send + Sync>;
type StatusListener = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Topic {
    Event(EventKind),
    Status,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    events: BTreeMap<EventKind, Vec<(u64, EventListener)>>,
    status: Vec<(u64, StatusListener)>,
}

impl Listeners {
    fn remove(&mut self, topic: Topic, id: u64) -> bool {
        match topic {
            Topic::Event(kind) => {
                let Some(list) = self.events.get_mut(&kind) else {
                    return false;
                };
                let before = list.len();
                list.retain(|(lid, _)| *lid != id);
                let removed = list.len() != before;
                if list.is_empty() {
                    self.events.remove(&kind);
                }
                removed
            }
            Topic::Status => {
                let before = self.status.len();
                self.status.retain(|(lid, _)| *lid != id);
                self.status.len() != before
            }
        }
    }
}

/// Registry of event and status listeners
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Listeners>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn on<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&ServerEvent) + Send + Sync + 'static,
    {
        let mut inner = lock(&self.inner);
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .events
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        Subscription::new(&self.inner, Topic::Event(kind), id)
    }

    /// Register a listener for connection status changes
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn on_status<F>(&self, listener: F) -> Subscription
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        let mut inner = lock(&self.inner);
        inner.next_id += 1;
        let id = inner.next_id;
        inner.status.push((id, Arc::new(listener)));
        Subscription::new(&self.inner, Topic::Status, id)
    }

    /// Deliver an event to every listener of its kind
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &ServerEvent) -> usize {
        let listeners: Vec<EventListener> = {
            let inner = lock(&self.inner);
            inner
                .events
                .get(&event.kind())
                .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };

        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    /// Deliver a status change to every status listener
    pub fn emit_status(&self, status: ConnectionStatus) -> usize {
        let listeners: Vec<StatusListener> = {
            let inner = lock(&self.inner);
            inner.status.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        for listener in &listeners {
            listener(status);
        }
        listeners.len()
    }

    /// Number of listeners registered for a kind
    pub fn listener_count(&self, kind: EventKind) -> usize {
        lock(&self.inner)
            .events
            .get(&kind)
            .map(|list| list.len())
            .unwrap_or(0)
    }

    /// Number of status listeners
    pub fn status_listener_count(&self) -> usize {
        lock(&self.inner).status.len()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("ListenerRegistry")
            .field("event_kinds", &inner.events.keys().collect::<Vec<_>>())
            .field("status_listeners", &inner.status.len())
            .finish()
    }
}

/// Unsubscribe token returned by [`ListenerRegistry::on`]
///
/// The listener stays attached for as long as the token lives. The token
/// only holds a weak reference, so it never keeps the registry alive.
#[must_use = "dropping the subscription detaches the listener"]
pub struct Subscription {
    registry: Weak<Mutex<Listeners>>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    fn new(registry: &Arc<Mutex<Listeners>>, topic: Topic, id: u64) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            topic,
            id,
        }
    }

    /// Detach the listener now
    pub fn unsubscribe(self) {
        // Drop does the work
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let inner = lock(&registry);
        match self.topic {
            Topic::Event(kind) => inner
                .events
                .get(&kind)
                .map(|list| list.iter().any(|(id, _)| *id == self.id))
                .unwrap_or(false),
            Topic::Status => inner.status.iter().any(|(id, _)| *id == self.id),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(self.topic, self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PointerRef;
    use crate::protocol::ConnectedInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn removed(id: &str) -> ServerEvent {
        ServerEvent::PointerRemoved(PointerRef { id: id.to_string() })
    }

    #[test]
    fn test_multiple_listeners_per_event() {
        let registry = ListenerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h1 = Arc::clone(&hits);
        let _s1 = registry.on(EventKind::PointerRemoved, move |_| {
            h1.fetch_add(1, Ordering::SeqCst);
        });
        let h2 = Arc::clone(&hits);
        let _s2 = registry.on(EventKind::PointerRemoved, move |_| {
            h2.fetch_add(10, Ordering::SeqCst);
        });

        assert_eq!(registry.emit(&removed("a")), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_only_matching_kind_is_invoked() {
        let registry = ListenerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let _s = registry.on(EventKind::Connected, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(registry.emit(&removed("a")), 0);
        assert_eq!(
            registry.emit(&ServerEvent::Connected(ConnectedInfo::default())),
            1
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_detaches_listener() {
        let registry = ListenerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let sub = registry.on(EventKind::PointerRemoved, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(sub.is_active());
        assert_eq!(registry.listener_count(EventKind::PointerRemoved), 1);

        sub.unsubscribe();
        assert_eq!(registry.listener_count(EventKind::PointerRemoved), 0);
        assert_eq!(registry.emit(&removed("a")), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outliving_registry() {
        let registry = ListenerRegistry::new();
        let sub = registry.on(EventKind::Pointers, |_| {});
        drop(registry);
        assert!(!sub.is_active());
        drop(sub);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let registry = ListenerRegistry::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot_in = Arc::clone(&slot);
        let sub = registry.on(EventKind::PointerRemoved, move |_| {
            slot_in.lock().unwrap().take();
        });
        *slot.lock().unwrap() = Some(sub);

        assert_eq!(registry.emit(&removed("a")), 1);
        assert_eq!(registry.listener_count(EventKind::PointerRemoved), 0);
    }

    #[test]
    fn test_status_listeners() {
        let registry = ListenerRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);
        let sub = registry.on_status(move |status| seen_in.lock().unwrap().push(status));

        registry.emit_status(ConnectionStatus::Connecting);
        registry.emit_status(ConnectionStatus::Connected);
        drop(sub);
        registry.emit_status(ConnectionStatus::Disconnected);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConnectionStatus::Connecting, ConnectionStatus::Connected]
        );
        assert_eq!(registry.status_listener_count(), 0);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ConnectionStatus::Connecting.to_string(), "Connecting...");
        assert!(ConnectionStatus::Connected.is_connected());
        assert!(!ConnectionStatus::Disconnected.is_connected());
    }
}
