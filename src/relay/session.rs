//! Per-connection session protocol.
//!
//! One `SessionProtocol` instance drives the lifetime of one client
//! connection through four states:
//!
//! ```text
//! Connecting --connect--> Syncing --sync--> Live --(transport close)--> Closed
//!                            \---(store unreachable)------------------> Closed
//! ```
//!
//! `Closed` is terminal and reached exactly once. The live loop is strictly
//! sequential per session: a message's append and fan-out complete entirely
//! before the next inbound message is processed. Across sessions the only
//! ordering is the total order of store ids.

use std::sync::Arc;

use thiserror::Error;

use crate::common::time::Clock;
use crate::domain::{ClientId, MessageStore, RenderedMessage, StorageError};

use super::registry::{ConnectionRegistry, OutboundSender};

/// Protocol states of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport accepted, not yet registered
    Connecting,
    /// Registered, replaying history
    Syncing,
    /// Steady-state read loop
    Live,
    /// Terminal
    Closed,
}

/// Fatal session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// History replay failed because the store was unreachable
    #[error("history sync failed: {0}")]
    Storage(#[from] StorageError),
}

/// State machine for one client connection.
///
/// Holds no direct reference to the connection record after registration —
/// only the client id and a handle to its own outbound channel, used to make
/// `close` safe when the registry entry has been superseded by a reconnect.
pub struct SessionProtocol {
    client_id: ClientId,
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    state: SessionState,
    outbound: Option<OutboundSender>,
}

impl SessionProtocol {
    pub(crate) fn new(
        client_id: ClientId,
        registry: Arc<ConnectionRegistry>,
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client_id,
            registry,
            store,
            clock,
            state: SessionState::Connecting,
            outbound: None,
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Connecting → Syncing: register this connection's outbound channel.
    ///
    /// Returns the sender of a superseded connection with the same client id,
    /// if one existed; dropping it ends that session's pusher loop.
    pub async fn connect(&mut self, sender: OutboundSender) -> Option<OutboundSender> {
        debug_assert_eq!(self.state, SessionState::Connecting);
        let replaced = self.registry.connect(&self.client_id, sender.clone()).await;
        self.outbound = Some(sender);
        self.state = SessionState::Syncing;
        tracing::info!("Client '{}' connected and registered", self.client_id.as_str());
        replaced
    }

    /// Syncing → Live: replay the full stored history to this client.
    ///
    /// Each historical message is tagged self or peer from this client's
    /// perspective. A storage failure here is fatal: the session deregisters
    /// and transitions directly to Closed.
    pub async fn sync(&mut self) -> Result<(), SessionError> {
        debug_assert_eq!(self.state, SessionState::Syncing);
        let history = match self.store.scan_all().await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(
                    "History sync for '{}' failed, closing session: {}",
                    self.client_id.as_str(),
                    e
                );
                self.deregister().await;
                self.state = SessionState::Closed;
                return Err(e.into());
            }
        };

        let count = history.len();
        for message in &history {
            // Best-effort: the pusher loop on the other end of the channel
            // owns actual socket I/O.
            let _ = self
                .registry
                .send_to(&self.client_id, message.render_for(&self.client_id))
                .await;
        }
        self.state = SessionState::Live;
        tracing::info!(
            "Replayed {} stored message(s) to '{}', session is live",
            count,
            self.client_id.as_str()
        );
        Ok(())
    }

    /// Live → Live: persist one inbound message, echo it to the sender and
    /// fan it out to the rest of the room.
    ///
    /// Order matters: the append completes before any delivery is attempted.
    /// If the append fails the message is neither echoed nor broadcast; the
    /// failure is logged and the session keeps waiting for the next message.
    pub async fn handle_message(&mut self, body: String) {
        debug_assert_eq!(self.state, SessionState::Live);
        let timestamp = self.clock.now_utc_millis();

        let message = match self
            .store
            .append(self.client_id.clone(), body, timestamp)
            .await
        {
            Ok(message) => message,
            Err(e) => {
                // Dropped silently: no echo, no broadcast, no notice to the
                // sender. The session stays live.
                tracing::warn!(
                    "Dropping message from '{}', append failed: {}",
                    self.client_id.as_str(),
                    e
                );
                return;
            }
        };

        let _ = self
            .registry
            .send_to(
                &self.client_id,
                RenderedMessage::own(message.timestamp, message.body.clone()),
            )
            .await;
        self.registry
            .broadcast_except(
                &self.client_id,
                RenderedMessage::peer(message.timestamp, message.sender.clone(), message.body),
            )
            .await;
    }

    /// Any state → Closed: deregister and announce the departure.
    ///
    /// Idempotent — a second call is a no-op, and a session whose registry
    /// entry was superseded by a reconnect does not evict its replacement.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        self.deregister().await;

        let notice = format!("Client @{} left the room", self.client_id.as_str());
        tracing::info!("{}", notice);
        self.registry
            .broadcast(RenderedMessage::server_notice(
                self.clock.now_utc_millis(),
                notice,
            ))
            .await;
    }

    async fn deregister(&self) {
        match &self.outbound {
            Some(sender) => {
                self.registry
                    .disconnect_channel(&self.client_id, sender)
                    .await;
            }
            // Never registered (closed before connect); nothing to remove.
            None => self.registry.disconnect(&self.client_id).await,
        }
    }
}
