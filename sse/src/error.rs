//! Error types for the `sse` hub.
use std::error::Error as StdError;
use std::fmt;

/// Top-level hub error.
/// The `error_kind` drives the HTTP status chosen by the web layer; `source`
/// keeps the lower level error when there is one.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// No live stream is registered for the client id.
    UnknownClient,
    /// Nobody ever subscribed to the channel.
    UnknownChannel,
    /// The channel exists but the client is not a member.
    NotSubscribed,
    /// The channel name cannot be used as an SSE event name.
    InvalidChannel,
    /// The payload could not be serialized to JSON.
    Serialization,
}

impl Error {
    pub fn new(error_kind: ErrorKind) -> Self {
        Self {
            source: None,
            error_kind,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.error_kind {
            ErrorKind::UnknownClient => write!(f, "Unknown Client ID"),
            ErrorKind::UnknownChannel => write!(f, "Unknown Channel"),
            ErrorKind::NotSubscribed => write!(f, "Not subscribed to this channel"),
            ErrorKind::InvalidChannel => write!(f, "Invalid channel name"),
            ErrorKind::Serialization => write!(f, "Unable to serialize channel payload"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<ErrorKind> for Error {
    fn from(error_kind: ErrorKind) -> Self {
        Error::new(error_kind)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Serialization,
        }
    }
}
