//! SSE HTTP handlers for the web layer.
//!
//! This module contains only the Axum handlers for the push-stream endpoint.
//! The hub itself (Manager, registries, message types) lives in the `sse`
//! crate.

pub mod handler;
