//! Domain identifiers (strongly-typed IDs).
//!
//! - **ActorId**: チャットプラットフォームが発行する利用者 ID（不透明な文字列）
//! - **MessageId**: 表示チャネル上のメッセージ ID（ULID ベース）
//!
//! ## なぜ newtype にするのか？
//! - 投稿者 ID とメッセージ ID を混同できない
//! - serde では素の文字列として扱われるため、保存形式は変わらない

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// ActorId はコマンドを発行した利用者を識別する
///
/// 投票者集合・推薦者・タイムゾーン設定のキーとして使う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// MessageId は表示チャネル上のメッセージを識別する
///
/// ULID なので生成順でソートでき、「最新 N 件」の判定に使える。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(Ulid);

impl MessageId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// 新しい MessageId を生成
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for MessageId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}
