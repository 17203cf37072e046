use async_trait::async_trait;
use events::{ChannelEvent, ChannelEventType, EventHandler};
use log::*;

/// Writes every lifecycle event to the log.
///
/// Connects are logged at info level, channel membership changes at debug.
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle(&self, event: &ChannelEvent) {
        match (event.event_type, event.channel.as_deref()) {
            (ChannelEventType::Connect, _) => {
                info!("SSE client {} connected", event.client_id);
            }
            (event_type, Some(channel)) => {
                debug!(
                    "SSE client {} {} '{}'",
                    event.client_id, event_type, channel
                );
            }
            (event_type, None) => {
                warn!(
                    "SSE client {} sent {} without a channel",
                    event.client_id, event_type
                );
            }
        }
    }
}
