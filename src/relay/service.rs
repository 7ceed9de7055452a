//! Composition root of the relay.

use std::sync::Arc;

use crate::common::time::{Clock, SystemClock};
use crate::domain::{ClientId, MessageStore};

use super::registry::ConnectionRegistry;
use super::session::SessionProtocol;

/// Owns the single `ConnectionRegistry` and `MessageStore` for the lifetime
/// of the process and opens one `SessionProtocol` per inbound connection.
///
/// Constructed explicitly in `main` and shared by reference — there are no
/// process-wide singletons.
pub struct ChatService {
    store: Arc<dyn MessageStore>,
    registry: Arc<ConnectionRegistry>,
    clock: Arc<dyn Clock>,
}

impl ChatService {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// As [`new`](Self::new) with an injected clock (tests use `FixedClock`).
    pub fn with_clock(store: Arc<dyn MessageStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            registry: Arc::new(ConnectionRegistry::new()),
            clock,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    /// Open a new session bound to the shared registry and store.
    ///
    /// The caller (the transport layer) drives the returned state machine:
    /// `connect`, then `sync`, then `handle_message` per inbound message,
    /// and finally `close`.
    pub fn open_session(&self, client_id: ClientId) -> SessionProtocol {
        SessionProtocol::new(
            client_id,
            self.registry.clone(),
            self.store.clone(),
            self.clock.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::InMemoryMessageStore;
    use crate::relay::SessionState;

    #[tokio::test]
    async fn test_open_session_starts_in_connecting_state() {
        // テスト項目: open_session は Connecting 状態のセッションを返す
        // given (前提条件):
        let service = ChatService::new(Arc::new(InMemoryMessageStore::new()));

        // when (操作):
        let session = service.open_session(ClientId::new("alice".to_string()).unwrap());

        // then (期待する結果):
        assert_eq!(session.state(), SessionState::Connecting);
        assert_eq!(session.client_id().as_str(), "alice");
        assert!(service.registry().is_empty().await);
    }
}
