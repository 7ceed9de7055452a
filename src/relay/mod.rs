//! The relay core: connection registry, per-connection session protocol and
//! the composition root that ties them to a message store.
//!
//! This is the only part of the crate with real concurrency and ordering
//! concerns; everything above it (transport, rendering) and below it
//! (storage) is replaceable at a trait or channel boundary.

mod registry;
mod service;
mod session;

pub use registry::{ConnectionRegistry, DeliveryError, OutboundSender};
pub use service::ChatService;
pub use session::{SessionError, SessionProtocol, SessionState};
