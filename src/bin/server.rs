//! Single-room chat relay server with durable history.
//!
//! Messages are persisted to SQLite before fan-out; late joiners are
//! replayed the full history before live traffic resumes.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000 --db ./chat.sqlite
//! ```

use std::sync::Arc;

use clap::Parser;
use spchat_rs::{
    common::logger::setup_logger, infrastructure::store::SqliteMessageStore, relay::ChatService,
    ui::Server,
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Single-room WebSocket chat relay with durable history", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "4242")]
    port: u16,

    /// Path to the SQLite database file
    #[arg(long, default_value = "./spchat.sqlite")]
    db: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. MessageStore (SQLite, schema ensured at open)
    // 2. ChatService (registry + store, one instance for the process)
    // 3. Server
    let store = match SqliteMessageStore::open(&args.db) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open message store at '{}': {}", args.db, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Message store opened at '{}'", args.db);

    let service = Arc::new(ChatService::new(store));

    let server = Server::new(service);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
