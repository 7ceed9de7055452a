//! The immutable chat message record.

use serde::Serialize;

use super::{ClientId, RenderedMessage};

/// One stored chat message.
///
/// Created only by `MessageStore::append`; never mutated or deleted. `id` is
/// assigned by the store and is strictly increasing in insertion order.
/// `timestamp` is assigned by the writer before the append, so under
/// concurrent writers timestamp order and id order can disagree — replay
/// order is always id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Store-assigned identifier, strictly increasing
    pub id: i64,
    /// Who sent the message
    pub sender: ClientId,
    /// Text content
    pub body: String,
    /// Writer-assigned Unix timestamp (UTC, milliseconds)
    pub timestamp: i64,
}

impl Message {
    /// Render this message from the perspective of `viewer`.
    ///
    /// A message is "self" iff `viewer` authored it; everyone else sees it
    /// as a peer message attributed to the sender.
    pub fn render_for(&self, viewer: &ClientId) -> RenderedMessage {
        if &self.sender == viewer {
            RenderedMessage::own(self.timestamp, self.body.clone())
        } else {
            RenderedMessage::peer(self.timestamp, self.sender.clone(), self.body.clone())
        }
    }
}
