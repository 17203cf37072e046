use crate::error::{Error, ErrorKind};
use axum::response::sse::Event;
use serde::Serialize;

/// A payload ready to be written to the streams of a channel's members.
///
/// The channel name becomes the SSE `event:` field and the JSON-serialized
/// payload the `data:` field.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub channel: String,
    pub data: String,
}

impl Message {
    pub fn new<T: Serialize + ?Sized>(channel: &str, payload: &T) -> Result<Self, Error> {
        validate_channel(channel)?;

        Ok(Self {
            channel: channel.to_string(),
            data: serde_json::to_string(payload)?,
        })
    }

    pub fn to_event(&self) -> Event {
        Event::default().event(&self.channel).data(&self.data)
    }
}

/// Channel names travel as SSE event names, which cannot span lines.
pub fn validate_channel(channel: &str) -> Result<(), Error> {
    if channel.is_empty() || channel.contains(['\n', '\r']) {
        return Err(Error::new(ErrorKind::InvalidChannel));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_serializes_payload_once() {
        let message = Message::new("scores", &json!({"home": 2})).unwrap();
        assert_eq!(message.channel, "scores");
        assert_eq!(message.data, r#"{"home":2}"#);
    }

    #[test]
    fn test_rejects_multiline_channel_names() {
        let err = Message::new("bad\nchannel", &json!({})).unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::InvalidChannel);
        assert!(validate_channel("").is_err());
        assert!(validate_channel("carriage\rreturn").is_err());
        assert!(validate_channel("room/42").is_ok());
    }
}
