//! The rendering boundary between the core and the templating layer.
//!
//! The core decides *what* a client should see — which message class, which
//! sender attribution — and hands a `RenderedMessage` to the ui layer, which
//! turns it into markup. No HTML is produced here.

use super::ClientId;

/// How a message should be rendered for a particular recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    /// A message authored by the recipient itself
    Own,
    /// A message authored by another participant
    Peer,
    /// A notice generated by the server (e.g. a departure announcement)
    ServerNotice,
}

/// One message as seen by one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Writer-assigned Unix timestamp (UTC, milliseconds)
    pub timestamp: i64,
    /// Text content
    pub body: String,
    /// Sender attribution. `Some` only for peer messages
    pub sender: Option<ClientId>,
    /// Rendering class
    pub class: MessageClass,
}

impl RenderedMessage {
    /// A message echoed back to its own author.
    pub fn own(timestamp: i64, body: String) -> Self {
        Self {
            timestamp,
            body,
            sender: None,
            class: MessageClass::Own,
        }
    }

    /// A message from another participant, attributed to its sender.
    pub fn peer(timestamp: i64, sender: ClientId, body: String) -> Self {
        Self {
            timestamp,
            body,
            sender: Some(sender),
            class: MessageClass::Peer,
        }
    }

    /// A server-generated notice.
    pub fn server_notice(timestamp: i64, body: String) -> Self {
        Self {
            timestamp,
            body,
            sender: None,
            class: MessageClass::ServerNotice,
        }
    }
}
