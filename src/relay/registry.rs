//! Connection registry: the single source of truth for who is currently
//! reachable.
//!
//! The registry maps a client id to the sending half of that connection's
//! outbound queue. Delivery here is an enqueue onto an unbounded channel
//! while the map lock is held — it never performs network I/O, so a slow or
//! stalled client cannot block membership changes or delivery to the rest of
//! the room. Each connection's own pusher task drains the queue into the
//! socket.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

use crate::domain::{ClientId, RenderedMessage};

/// Sending half of one connection's outbound queue
pub type OutboundSender = mpsc::UnboundedSender<RenderedMessage>;

/// Errors for a single delivery attempt
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// No live connection is registered under this client id
    #[error("client '{0}' is not connected")]
    ClientNotFound(String),

    /// The connection's outbound queue is closed (receiver dropped)
    #[error("outbound channel for client '{0}' is closed")]
    ChannelClosed(String),
}

/// Registry of live connections.
///
/// All operations are serialized on the internal map lock, so no caller ever
/// observes a partially updated map.
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<String, OutboundSender>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Register `sender` under `client_id`, replacing any prior entry for the
    /// same id.
    ///
    /// Returns the replaced sender, if any. The registry does not close the
    /// replaced channel — dropping the returned sender is the caller's call.
    /// The superseded session stops receiving fan-out either way.
    pub async fn connect(
        &self,
        client_id: &ClientId,
        sender: OutboundSender,
    ) -> Option<OutboundSender> {
        let mut connections = self.connections.lock().await;
        let replaced = connections.insert(client_id.as_str().to_string(), sender);
        if replaced.is_some() {
            tracing::info!(
                "Client '{}' reconnected, superseding its previous connection",
                client_id.as_str()
            );
        } else {
            tracing::debug!("Client '{}' registered", client_id.as_str());
        }
        replaced
    }

    /// Remove the entry for `client_id` if present. No-op if absent.
    pub async fn disconnect(&self, client_id: &ClientId) {
        let mut connections = self.connections.lock().await;
        if connections.remove(client_id.as_str()).is_some() {
            tracing::debug!("Client '{}' removed from registry", client_id.as_str());
        }
    }

    /// Remove the entry for `client_id` only if it still holds `sender`.
    ///
    /// Used by a closing session so that, when its entry was already
    /// superseded by a reconnect, it cannot evict its replacement.
    pub async fn disconnect_channel(&self, client_id: &ClientId, sender: &OutboundSender) {
        let mut connections = self.connections.lock().await;
        if let Some(current) = connections.get(client_id.as_str()) {
            if current.same_channel(sender) {
                connections.remove(client_id.as_str());
                tracing::debug!("Client '{}' removed from registry", client_id.as_str());
            } else {
                tracing::debug!(
                    "Client '{}' was already superseded, leaving its replacement registered",
                    client_id.as_str()
                );
            }
        }
    }

    /// Deliver `payload` to the named connection, if present.
    ///
    /// Delivery is best-effort: the caller may ignore the error, in which
    /// case the payload is silently dropped for this recipient.
    pub async fn send_to(
        &self,
        client_id: &ClientId,
        payload: RenderedMessage,
    ) -> Result<(), DeliveryError> {
        let connections = self.connections.lock().await;
        let sender = connections
            .get(client_id.as_str())
            .ok_or_else(|| DeliveryError::ClientNotFound(client_id.as_str().to_string()))?;
        sender
            .send(payload)
            .map_err(|_| DeliveryError::ChannelClosed(client_id.as_str().to_string()))
    }

    /// Deliver `payload` to every registered connection.
    ///
    /// Per-recipient failures are logged and skipped; they never abort
    /// delivery to the remaining connections.
    pub async fn broadcast(&self, payload: RenderedMessage) {
        let connections = self.connections.lock().await;
        for (id, sender) in connections.iter() {
            if sender.send(payload.clone()).is_err() {
                tracing::warn!("Failed to enqueue broadcast for client '{}'", id);
            }
        }
    }

    /// As [`broadcast`](Self::broadcast), skipping the connection registered
    /// under `exclude_id`.
    pub async fn broadcast_except(&self, exclude_id: &ClientId, payload: RenderedMessage) {
        let connections = self.connections.lock().await;
        for (id, sender) in connections.iter() {
            if id.as_str() == exclude_id.as_str() {
                continue;
            }
            if sender.send(payload.clone()).is_err() {
                tracing::warn!("Failed to enqueue broadcast for client '{}'", id);
            }
        }
    }

    /// Whether a connection is registered under `client_id`.
    pub async fn contains(&self, client_id: &ClientId) -> bool {
        let connections = self.connections.lock().await;
        connections.contains_key(client_id.as_str())
    }

    /// Number of live connections.
    pub async fn len(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
