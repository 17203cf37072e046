use crate::channel::{ChannelRegistry, Removal};
use crate::connection::{ClientId, ConnectionId, ConnectionRegistry, EventSender};
use crate::error::{Error, ErrorKind};
use crate::message::{validate_channel, Message};
use events::{ChannelEvent, EventPublisher};
use log::*;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a successful subscribe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    channels: ChannelRegistry,
    publisher: EventPublisher,
}

impl Manager {
    pub fn new() -> Self {
        Self::with_publisher(EventPublisher::new())
    }

    pub fn with_publisher(publisher: EventPublisher) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            channels: ChannelRegistry::new(),
            publisher,
        }
    }

    /// Register the push-stream of a client and return its connection id
    pub async fn register_stream(&self, client_id: ClientId, sender: EventSender) -> ConnectionId {
        let connection_id = self.registry.register(client_id.clone(), sender);
        info!("Registered SSE stream for client {}", client_id);

        self.publisher
            .publish(ChannelEvent::connect(client_id.as_str()))
            .await;

        connection_id
    }

    /// Unregister a stream once its response has been dropped.
    ///
    /// Ignored when the client already opened a newer stream.
    pub fn unregister_stream(&self, client_id: &ClientId, connection_id: &ConnectionId) {
        if !self.registry.unregister(client_id, connection_id) {
            debug!(
                "Stream {} of client {} was already replaced",
                connection_id.as_str(),
                client_id
            );
            return;
        }

        let dropped = self.channels.remove_everywhere(client_id);
        info!(
            "Unregistered SSE stream for client {} ({} channel membership(s) dropped)",
            client_id, dropped
        );
    }

    pub async fn subscribe(
        &self,
        client_id: &ClientId,
        channel: &str,
    ) -> Result<SubscribeOutcome, Error> {
        if !self.registry.contains(client_id) {
            return Err(ErrorKind::UnknownClient.into());
        }
        validate_channel(channel)?;

        if !self.channels.add(channel, client_id) {
            debug!("Client {} already subscribed to '{}'", client_id, channel);
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }

        debug!("Client {} subscribed to '{}'", client_id, channel);
        self.publisher
            .publish(ChannelEvent::subscribe(client_id.as_str(), channel))
            .await;

        Ok(SubscribeOutcome::Subscribed)
    }

    pub async fn unsubscribe(&self, client_id: &ClientId, channel: &str) -> Result<(), Error> {
        if !self.registry.contains(client_id) {
            return Err(ErrorKind::UnknownClient.into());
        }

        match self.channels.remove(channel, client_id) {
            Removal::UnknownChannel => Err(ErrorKind::UnknownChannel.into()),
            Removal::NotMember => Err(ErrorKind::NotSubscribed.into()),
            Removal::Removed => {
                debug!("Client {} unsubscribed from '{}'", client_id, channel);
                self.publisher
                    .publish(ChannelEvent::unsubscribe(client_id.as_str(), channel))
                    .await;
                Ok(())
            }
        }
    }

    /// Push `payload` to every member of `channel`.
    ///
    /// Returns the number of streams the event was written to. A channel
    /// without members is not an error.
    pub fn emit<T: Serialize + ?Sized>(&self, channel: &str, payload: &T) -> Result<usize, Error> {
        let members = self.channels.members(channel);
        if members.is_empty() {
            return Ok(0);
        }

        let message = Message::new(channel, payload)?;
        let event = message.to_event();

        let delivered = members
            .iter()
            .filter(|client_id| self.registry.send_to_client(client_id, event.clone()))
            .count();

        debug!(
            "Emitted '{}' to {}/{} subscriber(s)",
            channel,
            delivered,
            members.len()
        );

        Ok(delivered)
    }

    pub fn subscribers(&self, channel: &str) -> Vec<ClientId> {
        self.channels.members(channel)
    }

    pub fn is_connected(&self, client_id: &ClientId) -> bool {
        self.registry.contains(client_id)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
