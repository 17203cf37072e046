//! Error types for the `sse-client` crate.
//!
//! Follows the usual layout of a root Error struct holding an error kind
//! enum plus an optional source for chaining.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for sse-client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of client errors.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The push-stream could not be opened.
    Connection(ConnectionErrorKind),
    /// The server refused to add the client to the named channel.
    Subscription(String),
    /// The server refused to remove the client from the named channel.
    Unsubscription(String),
    /// An HTTP call failed before a status code was received.
    Http(HttpErrorKind),
}

/// Reasons the push-stream failed to open.
#[derive(Debug, PartialEq)]
pub enum ConnectionErrorKind {
    UnexpectedStatus(u16),
    UnexpectedContentType(String),
    Network,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Timeout,
    Network,
}

impl Error {
    pub fn new(error_kind: ErrorKind) -> Self {
        Self {
            source: None,
            error_kind,
        }
    }

    pub fn subscription(channel: &str) -> Self {
        Self::new(ErrorKind::Subscription(channel.to_string()))
    }

    pub fn unsubscription(channel: &str) -> Self {
        Self::new(ErrorKind::Unsubscription(channel.to_string()))
    }

    /// The channel named by a subscription or unsubscription failure.
    pub fn channel(&self) -> Option<&str> {
        match &self.error_kind {
            ErrorKind::Subscription(channel) | ErrorKind::Unsubscription(channel) => Some(channel),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Subscription(channel) => {
                write!(f, "Unable to subscribe to '{channel}' channel")
            }
            ErrorKind::Unsubscription(channel) => {
                write!(f, "Unable to unsubscribe from '{channel}' channel")
            }
            ErrorKind::Connection(ConnectionErrorKind::UnexpectedStatus(status)) => {
                write!(f, "Connection error: server answered {status}")
            }
            ErrorKind::Connection(ConnectionErrorKind::UnexpectedContentType(content_type)) => {
                write!(f, "Connection error: not an event stream ({content_type})")
            }
            ErrorKind::Connection(kind) => write!(f, "Connection error: {kind:?}"),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {kind:?}"),
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

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            HttpErrorKind::BuilderFailed
        } else if err.is_timeout() {
            HttpErrorKind::Timeout
        } else if err.is_request() {
            HttpErrorKind::RequestFailed
        } else {
            HttpErrorKind::Network
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(error_kind),
        }
    }
}
