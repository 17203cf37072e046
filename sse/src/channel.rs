use crate::connection::ClientId;
use dashmap::DashMap;
use std::collections::HashSet;

/// Channel membership index: channel name -> member client ids.
///
/// A channel entry is created by its first subscriber and outlives its
/// members, so leaving twice reports "not subscribed" rather than
/// "unknown channel".
pub struct ChannelRegistry {
    channels: DashMap<String, HashSet<ClientId>>,
}

/// Result of removing a member from a channel.
#[derive(Debug, PartialEq, Eq)]
pub enum Removal {
    Removed,
    UnknownChannel,
    NotMember,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Add `client_id` to `channel`. Returns false if it was already a member.
    pub fn add(&self, channel: &str, client_id: &ClientId) -> bool {
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(client_id.clone())
    }

    pub fn remove(&self, channel: &str, client_id: &ClientId) -> Removal {
        match self.channels.get_mut(channel) {
            None => Removal::UnknownChannel,
            Some(mut members) => {
                if members.remove(client_id) {
                    Removal::Removed
                } else {
                    Removal::NotMember
                }
            }
        }
    }

    /// Drop `client_id` from every channel it belongs to.
    pub fn remove_everywhere(&self, client_id: &ClientId) -> usize {
        let mut removed = 0;
        for mut entry in self.channels.iter_mut() {
            if entry.value_mut().remove(client_id) {
                removed += 1;
            }
        }
        removed
    }

    /// Snapshot of the members of `channel`; empty for unknown channels.
    pub fn members(&self, channel: &str) -> Vec<ClientId> {
        self.channels
            .get(channel)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_member(&self, channel: &str, client_id: &ClientId) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|members| members.contains(client_id))
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
