//! Single-room WebSocket chat relay with durable message history.
//!
//! Clients connect over WebSocket, every inbound message is persisted before
//! it is fanned out to the rest of the room, and a client joining late is
//! replayed the full history before live traffic resumes.

// layers
pub mod domain;
pub mod infrastructure;
pub mod relay;
pub mod ui;

// shared library
pub mod common;
