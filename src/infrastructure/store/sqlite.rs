//! SQLite を使った MessageStore 実装
//!
//! ## 設計ノート
//!
//! - テーブルは追記専用。`id INTEGER PRIMARY KEY AUTOINCREMENT` により
//!   挿入順に厳密増加する id が保証される。
//! - `rusqlite::Connection` を `tokio::sync::Mutex` で保護し、append と
//!   scan を直列化する（半書き込みレコードを観測しない）。
//! - スキーマはオープン時に作成する。マイグレーション機構は持たない。

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{Connection, params};
use tokio::sync::Mutex;

use crate::domain::{ClientId, Message, MessageStore, StorageError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sender TEXT NOT NULL,
    body TEXT NOT NULL,
    at INTEGER NOT NULL
)";

/// SQLite-backed append-only message store.
pub struct SqliteMessageStore {
    conn: Mutex<Connection>,
}

impl SqliteMessageStore {
    /// Open (or create) the database file at `path` and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(map_sqlite_err)?;
        Self::init(conn)
    }

    /// Open a private in-memory database (used by tests).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(SCHEMA, []).map_err(map_sqlite_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn map_sqlite_err(e: rusqlite::Error) -> StorageError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::Constraint(e.to_string())
        }
        _ => StorageError::Unavailable(e.to_string()),
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn append(
        &self,
        sender: ClientId,
        body: String,
        timestamp: i64,
    ) -> Result<Message, StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO messages (sender, body, at) VALUES (?1, ?2, ?3)",
            params![sender.as_str(), body, timestamp],
        )
        .map_err(map_sqlite_err)?;
        let id = conn.last_insert_rowid();
        tracing::debug!("Appended message {} from '{}'", id, sender.as_str());

        Ok(Message {
            id,
            sender,
            body,
            timestamp,
        })
    }

    async fn scan_all(&self) -> Result<Vec<Message>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT id, sender, body, at FROM messages ORDER BY id ASC")
            .map_err(map_sqlite_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(map_sqlite_err)?;

        let mut messages = Vec::new();
        for row in rows {
            let (id, sender, body, timestamp) = row.map_err(map_sqlite_err)?;
            // sender は挿入時に検証済み。壊れた行は制約違反として報告する
            let sender = ClientId::new(sender).map_err(|e| StorageError::Constraint(e.to_string()))?;
            messages.push(Message {
                id,
                sender,
                body,
                timestamp,
            });
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str) -> ClientId {
        ClientId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_append_returns_strictly_increasing_ids() {
        // テスト項目: append の返す id が挿入順に厳密増加する
        // given (前提条件):
        let store = SqliteMessageStore::open_in_memory().unwrap();

        // when (操作):
        let m1 = store.append(client("alice"), "one".to_string(), 10).await.unwrap();
        let m2 = store.append(client("bob"), "two".to_string(), 20).await.unwrap();
        let m3 = store.append(client("alice"), "three".to_string(), 30).await.unwrap();

        // then (期待する結果):
        assert!(m1.id < m2.id);
        assert!(m2.id < m3.id);
    }

    #[tokio::test]
    async fn test_scan_all_returns_insertion_order() {
        // テスト項目: scan_all が挿入順（id 昇順）で全メッセージを返す
        // given (前提条件):
        let store = SqliteMessageStore::open_in_memory().unwrap();
        store.append(client("alice"), "one".to_string(), 10).await.unwrap();
        store.append(client("bob"), "two".to_string(), 20).await.unwrap();

        // when (操作):
        let messages = store.scan_all().await.unwrap();

        // then (期待する結果):
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].body, "one");
        assert_eq!(messages[0].sender.as_str(), "alice");
        assert_eq!(messages[1].body, "two");
        assert_eq!(messages[1].sender.as_str(), "bob");
    }

    #[tokio::test]
    async fn test_replay_order_is_id_order_not_timestamp_order() {
        // テスト項目: タイムスタンプが逆順でも、リプレイ順は id 順のまま
        // （タイムスタンプは書き込み側が割り当てるため、時計のずれで
        //   挿入順と食い違うことがある）
        // given (前提条件):
        let store = SqliteMessageStore::open_in_memory().unwrap();
        store.append(client("alice"), "first".to_string(), 3000).await.unwrap();
        store.append(client("bob"), "second".to_string(), 1000).await.unwrap();
        store.append(client("alice"), "third".to_string(), 2000).await.unwrap();

        // when (操作):
        let messages = store.scan_all().await.unwrap();

        // then (期待する結果):
        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
        assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_scan_all_is_restartable() {
        // テスト項目: scan_all を繰り返し呼んでも同じ結果が得られる
        // given (前提条件):
        let store = SqliteMessageStore::open_in_memory().unwrap();
        store.append(client("alice"), "hi".to_string(), 10).await.unwrap();

        // when (操作):
        let first = store.scan_all().await.unwrap();
        let second = store.scan_all().await.unwrap();

        // then (期待する結果):
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_scan_all_on_empty_store_returns_empty() {
        // テスト項目: 空のストアでは scan_all が空列を返す
        // given (前提条件):
        let store = SqliteMessageStore::open_in_memory().unwrap();

        // when (操作):
        let messages = store.scan_all().await.unwrap();

        // then (期待する結果):
        assert!(messages.is_empty());
    }
}
