//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::relay::ChatService;

use super::{
    handler::{get_history, get_home, health_check, post_room, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// The chat relay server.
///
/// # Example
///
/// ```ignore
/// let service = Arc::new(ChatService::new(store));
/// Server::new(service).run("127.0.0.1".to_string(), 4242).await?;
/// ```
pub struct Server {
    service: Arc<ChatService>,
}

impl Server {
    pub fn new(service: Arc<ChatService>) -> Self {
        Self { service }
    }

    /// Run the chat relay server.
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 4242)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            service: self.service,
        });

        let app = Router::new()
            // pages
            .route("/", get(get_home))
            .route("/room", post(post_room))
            // WebSocket endpoint
            .route("/ws/{client_id}", get(websocket_handler))
            // HTTP API
            .route("/api/health", get(health_check))
            .route("/api/history", get(get_history))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat relay listening on {}", listener.local_addr()?);
        tracing::info!("Open http://{} in a browser to join the room", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
