use dashmap::DashMap;
use log::*;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Callback receiving the decoded payload of each delivery on a channel.
pub type ChannelCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// Channel name -> delivery callback, shared with the stream reader.
///
/// Doubles as the subscription memory replayed on reconnect.
#[derive(Clone, Default)]
pub struct ChannelTable {
    callbacks: Arc<DashMap<String, ChannelCallback>>,
}

impl ChannelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `callback` for `channel` unless the channel already has one.
    ///
    /// Returns false when an earlier callback was kept.
    pub fn insert(&self, channel: &str, callback: ChannelCallback) -> bool {
        let mut inserted = false;
        self.callbacks
            .entry(channel.to_string())
            .or_insert_with(|| {
                inserted = true;
                callback
            });
        inserted
    }

    pub fn remove(&self, channel: &str) -> bool {
        self.callbacks.remove(channel).is_some()
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.callbacks.contains_key(channel)
    }

    pub fn names(&self) -> Vec<String> {
        self.callbacks
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Hands one received event to the callback of its channel.
    ///
    /// Events for channels without a callback are dropped. Returns whether a
    /// callback ran.
    pub fn dispatch(&self, channel: &str, data: &str) -> bool {
        // Clone out so the map is not locked while user code runs.
        let Some(callback) = self.callbacks.get(channel).map(|entry| entry.value().clone())
        else {
            trace!("Dropping event for unsubscribed channel '{channel}'");
            return false;
        };

        callback(decode_payload(channel, data));
        true
    }
}

/// Parses an event payload as JSON; anything unparsable becomes `{}`.
pub fn decode_payload(channel: &str, data: &str) -> Value {
    serde_json::from_str(data).unwrap_or_else(|e| {
        debug!("Malformed payload on channel '{channel}': {e}");
        Value::Object(Map::new())
    })
}
