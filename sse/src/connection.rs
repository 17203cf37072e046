use axum::response::sse::Event;
use dashmap::DashMap;
use log::*;
use std::convert::Infallible;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

pub type EventSender = UnboundedSender<Result<Event, Infallible>>;

/// Client-chosen identifier, stable across reconnects of the same client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Unique identifier for one stream (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// The live stream of a client
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub connection_id: ConnectionId,
    pub sender: EventSender,
}

/// Stream registry: at most one live stream per client id
pub struct ConnectionRegistry {
    connections: DashMap<ClientId, ConnectionInfo>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a stream for `client_id`, replacing any previous one - O(1)
    pub fn register(&self, client_id: ClientId, sender: EventSender) -> ConnectionId {
        let connection_id = ConnectionId::new();

        let previous = self.connections.insert(
            client_id.clone(),
            ConnectionInfo {
                connection_id: connection_id.clone(),
                sender,
            },
        );

        if let Some(previous) = previous {
            debug!(
                "Client {} reconnected, replacing stream {}",
                client_id,
                previous.connection_id.as_str()
            );
        }

        connection_id
    }

    /// Unregister the stream of `client_id` if it is still `connection_id` - O(1)
    ///
    /// Returns true when a stream was actually removed.
    pub fn unregister(&self, client_id: &ClientId, connection_id: &ConnectionId) -> bool {
        self.connections
            .remove_if(client_id, |_, info| &info.connection_id == connection_id)
            .is_some()
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.connections.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Send an event to one client - O(1)
    ///
    /// Returns false when the client has no stream or the stream is gone.
    pub fn send_to_client(&self, client_id: &ClientId, event: Event) -> bool {
        let Some(info) = self.connections.get(client_id) else {
            return false;
        };

        match info.sender.send(Ok(event)) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Failed to send event to client {} (connection {}): {}. Connection will be cleaned up.",
                    client_id,
                    info.connection_id.as_str(),
                    e
                );
                false
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
