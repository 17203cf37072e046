//! Channel lifecycle events for the SSE hub.
//!
//! This crate provides the observer seam that lets server code react to what
//! clients do with their push-streams, without the hub knowing who listens.
//!
//! # Architecture
//!
//! - **ChannelEvent**: a client opened its stream, joined a channel or left one
//! - **EventHandler**: trait for implementing listeners
//! - **EventPublisher**: publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates, so both the hub (`sse`)
//! and the binaries can depend on it.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// The kinds of lifecycle events the hub emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelEventType {
    /// A client opened (or re-opened) its push-stream.
    Connect,
    /// A client joined a channel.
    Subscribe,
    /// A client left a channel.
    Unsubscribe,
}

impl ChannelEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelEventType::Connect => "connect",
            ChannelEventType::Subscribe => "subscribe",
            ChannelEventType::Unsubscribe => "unsubscribe",
        }
    }
}

impl fmt::Display for ChannelEventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lifecycle event.
///
/// `channel` is `None` for `Connect`, which concerns the stream as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    pub event_type: ChannelEventType,
    pub client_id: String,
    pub channel: Option<String>,
}

impl ChannelEvent {
    pub fn connect(client_id: impl Into<String>) -> Self {
        Self {
            event_type: ChannelEventType::Connect,
            client_id: client_id.into(),
            channel: None,
        }
    }

    pub fn subscribe(client_id: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            event_type: ChannelEventType::Subscribe,
            client_id: client_id.into(),
            channel: Some(channel.into()),
        }
    }

    pub fn unsubscribe(client_id: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            event_type: ChannelEventType::Unsubscribe,
            client_id: client_id.into(),
            channel: Some(channel.into()),
        }
    }
}

/// Trait for handling lifecycle events.
/// Implementations can perform side effects like logging, metrics or
/// pushing a welcome message to a freshly subscribed client.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Restricts the handler to one event type. `None` receives everything.
    fn event_type(&self) -> Option<ChannelEventType> {
        None
    }

    async fn handle(&self, event: &ChannelEvent);
}

/// Publishes lifecycle events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher wherever the hub is built.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to every handler interested in its type.
    pub async fn publish(&self, event: ChannelEvent) {
        for handler in self.handlers.iter() {
            match handler.event_type() {
                Some(wanted) if wanted != event.event_type => continue,
                _ => handler.handle(&event).await,
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
