//! MessageStore 実装
//!
//! ## 実装
//!
//! - `sqlite`: SQLite を使った永続化実装（本番用）
//! - `inmemory`: Vec をインメモリ DB として使う実装（テスト用）

pub mod inmemory;
pub mod sqlite;

pub use inmemory::InMemoryMessageStore;
pub use sqlite::SqliteMessageStore;
