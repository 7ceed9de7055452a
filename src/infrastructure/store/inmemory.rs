//! インメモリ MessageStore 実装
//!
//! Vec をインメモリ DB として使用します。プロセスを跨ぐ永続性はないため、
//! 主にテストと使い捨ての実行で使用します。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientId, Message, MessageStore, StorageError};

struct Inner {
    next_id: i64,
    messages: Vec<Message>,
}

/// In-memory append-only message store.
pub struct InMemoryMessageStore {
    inner: Mutex<Inner>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                messages: Vec::new(),
            }),
        }
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(
        &self,
        sender: ClientId,
        body: String,
        timestamp: i64,
    ) -> Result<Message, StorageError> {
        let mut inner = self.inner.lock().await;
        let message = Message {
            id: inner.next_id,
            sender,
            body,
            timestamp,
        };
        inner.next_id += 1;
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn scan_all(&self) -> Result<Vec<Message>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner.messages.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn client(id: &str) -> ClientId {
        ClientId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_append_then_scan_preserves_order() {
        // テスト項目: append した順に scan_all が返す
        // given (前提条件):
        let store = InMemoryMessageStore::new();

        // when (操作):
        store.append(client("alice"), "one".to_string(), 10).await.unwrap();
        store.append(client("bob"), "two".to_string(), 20).await.unwrap();
        let messages = store.scan_all().await.unwrap();

        // then (期待する結果):
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, 1);
        assert_eq!(messages[0].body, "one");
        assert_eq!(messages[1].id, 2);
        assert_eq!(messages[1].body, "two");
    }

    #[tokio::test]
    async fn test_concurrent_appends_produce_unique_increasing_ids() {
        // テスト項目: 並行 append の id が重複せず、全体として厳密増加列になる
        // given (前提条件):
        let store = Arc::new(InMemoryMessageStore::new());
        let n = 50;

        // when (操作): n 個のタスクが並行に append する
        let mut handles = Vec::new();
        for i in 0..n {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(client("writer"), format!("msg {i}"), i as i64)
                    .await
                    .unwrap()
                    .id
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        // then (期待する結果): 重複なし、ストア内では id 昇順
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), n);

        let messages = store.scan_all().await.unwrap();
        assert_eq!(messages.len(), n);
        assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
    }
}
