//! Domain model of the chat relay.
//!
//! Value objects, the immutable message record, the rendering-boundary tuple
//! and the `MessageStore` trait live here. Concrete storage lives in the
//! infrastructure layer (dependency inversion).

mod client_id;
mod message;
mod render;
mod store;

pub use client_id::{ClientId, ClientIdError};
pub use message::Message;
pub use render::{MessageClass, RenderedMessage};
#[cfg(test)]
pub use store::MockMessageStore;
pub use store::{MessageStore, StorageError};
