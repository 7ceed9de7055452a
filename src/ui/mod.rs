//! HTTP/WebSocket transport and HTML rendering.

mod handler;
pub mod render;
mod server;
mod signal;
mod state;

pub use server::Server;
