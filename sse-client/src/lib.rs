//! Channel-multiplexing client for Server-Sent Events (SSE).
//!
//! One `SseClient` keeps a single push-stream open to a server and fans the
//! named events arriving on it out to per-channel callbacks. Joining and
//! leaving channels are plain HTTP calls correlated with the stream through a
//! client id.
//!
//! # Protocol
//!
//! - `GET  {base}/__sse/{client_id}`: the push-stream; event names are channel names
//! - `POST {base}/__sse/{client_id}/channel/{channel}`: join, 200 on success
//! - `DELETE {base}/__sse/{client_id}/channel/{channel}`: leave, 200 on success
//!
//! # Example
//!
//! ```rust,ignore
//! use sse_client::{ClientEvent, SseClient};
//!
//! let mut client = SseClient::new("localhost:4000")?;
//! client.add_event_listener(ClientEvent::ConnectionLost, |_| eprintln!("stream dropped"));
//! client.connect().await?;
//!
//! if client.subscribe("scores", |payload| println!("{payload}")).await {
//!     // deliveries for "scores" now reach the closure
//! }
//! ```
//!
//! # Modules
//!
//! - `channel`: the channel name to callback table and payload decoding
//! - `client`: `SseClient` and its builder
//! - `connection`: the open push-stream and the task reading it
//! - `endpoint`: URL construction for the three endpoints
//! - `error`: client error type
//! - `event`: local lifecycle events and their listeners
//! - `store`: session-scoped persistence of the client id

pub mod channel;
pub mod client;
mod connection;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod store;

pub use client::{ClientBuilder, SseClient};
pub use error::{Error, ErrorKind};
pub use event::ClientEvent;
