//! Server state shared across handlers.

use std::sync::Arc;

use crate::relay::ChatService;

/// Shared application state
pub struct AppState {
    /// The single relay instance for the process lifetime
    pub service: Arc<ChatService>,
}
