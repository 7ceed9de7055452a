//! MessageStore trait 定義
//!
//! ドメイン層が必要とするメッセージ永続化のインターフェースを定義します。
//! 具体的な実装（SQLite / インメモリ）は Infrastructure 層が提供します
//! （依存性の逆転）。

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use super::{ClientId, Message};

/// ストレージ操作のエラー
#[derive(Debug, Error)]
pub enum StorageError {
    /// 永続化層に到達できない（接続断、I/O エラーなど）
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// スキーマ制約違反（NOT NULL 違反など）
    #[error("storage constraint violated: {0}")]
    Constraint(String),
}

/// Message Store trait
///
/// 追記専用のメッセージ永続化。update / delete は存在しない。
///
/// ## 契約
///
/// - `append` は原子的に 1 件を永続化し、過去に返した全ての id より
///   厳密に大きい id を持つ `Message` を返す。失敗しても既存レコードは
///   壊れない。
/// - `scan_all` は id 昇順で全メッセージを返す。スキャン開始以前に
///   完了した append は必ず反映される（スキャンと競合する append の
///   反映は保証しない）。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// メッセージを 1 件永続化する
    async fn append(
        &self,
        sender: ClientId,
        body: String,
        timestamp: i64,
    ) -> Result<Message, StorageError>;

    /// 全メッセージを id 昇順で取得する
    async fn scan_all(&self) -> Result<Vec<Message>, StorageError>;
}
