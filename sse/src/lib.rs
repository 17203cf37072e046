//! Server-Sent Events (SSE) channel hub.
//!
//! This crate is the server half of the channel protocol: clients open one
//! push-stream each, then join and leave named channels over plain HTTP calls.
//! Anything emitted on a channel is written to the stream of every member.
//!
//! # Architecture
//!
//! - **One stream per client id**: the id is chosen by the client and reused
//!   across reconnects. A new stream for a known id replaces the old one.
//! - **Connection ids**: every stream gets a server-generated id so that the
//!   cleanup of a replaced stream cannot evict its successor.
//! - **Channel index**: channel name to member client ids, kept in a DashMap
//!   next to the stream registry.
//! - **Ephemeral messages**: a member without a live stream simply misses the
//!   message.
//! - **Lifecycle events**: connect / subscribe / unsubscribe are published
//!   through an `events::EventPublisher`.
//!
//! # Wire protocol
//!
//! 1. Client opens `GET /__sse/{client_id}`
//! 2. Client joins with `POST /__sse/{client_id}/channel/{channel}`
//! 3. Server code calls `manager.emit(channel, &payload)`; members receive
//!    `event: {channel}` with the JSON payload as `data`
//! 4. Client leaves with `DELETE /__sse/{client_id}/channel/{channel}`
//!
//! # Example: emitting on a channel
//!
//! ```rust,ignore
//! let delivered = app_state.sse_manager.emit("scores", &json!({ "home": 2, "away": 1 }))?;
//! ```
//!
//! # Modules
//!
//! - `channel`: channel membership index
//! - `connection`: stream registry keyed by client id, with connection ids
//! - `error`: hub error type
//! - `lifecycle`: log-based lifecycle event handler
//! - `manager`: high-level operations used by the web layer
//! - `message`: conversion of channel payloads into SSE events
//! - `ticker`: periodic demo emitter for a single channel

pub mod channel;
pub mod connection;
pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod message;
pub mod ticker;

pub use connection::{ClientId, ConnectionId};
pub use manager::{Manager, SubscribeOutcome};
