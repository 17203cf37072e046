use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Local events a client emits about its push-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientEvent {
    /// The stream opened and remembered subscriptions were renewed.
    Connect,
    /// The stream failed to open.
    ConnectionError,
    /// An open stream reported an error or ended. `connect()` reopens it.
    ConnectionLost,
}

impl ClientEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientEvent::Connect => "open",
            ClientEvent::ConnectionError => "connection-error",
            ClientEvent::ConnectionLost => "connection-lost",
        }
    }
}

impl fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Listener = Arc<dyn Fn(ClientEvent) + Send + Sync>;

/// Listener registry, cloned into the stream reader task.
#[derive(Clone, Default)]
pub struct EventListeners {
    listeners: Arc<DashMap<ClientEvent, Vec<Listener>>>,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, event: ClientEvent, listener: Listener) {
        self.listeners.entry(event).or_default().push(listener);
    }

    /// Calls every listener of `event` in registration order.
    pub fn dispatch(&self, event: ClientEvent) {
        let listeners = self
            .listeners
            .get(&event)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_dispatch_only_reaches_matching_listeners() {
        let listeners = EventListeners::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        listeners.add(
            ClientEvent::ConnectionLost,
            Arc::new(move |event| sink.lock().unwrap().push(event)),
        );

        listeners.dispatch(ClientEvent::Connect);
        listeners.dispatch(ClientEvent::ConnectionLost);

        assert_eq!(*seen.lock().unwrap(), vec![ClientEvent::ConnectionLost]);
    }

    #[test]
    fn test_listener_may_register_another_listener() {
        let listeners = EventListeners::new();
        let inner = listeners.clone();
        listeners.add(
            ClientEvent::Connect,
            Arc::new(move |_| inner.add(ClientEvent::Connect, Arc::new(|_| {}))),
        );

        listeners.dispatch(ClientEvent::Connect);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(ClientEvent::Connect.to_string(), "open");
        assert_eq!(ClientEvent::ConnectionError.as_str(), "connection-error");
        assert_eq!(ClientEvent::ConnectionLost.as_str(), "connection-lost");
    }
}
