//! DisplayChannel port - 外部表示チャネル
//!
//! システム自身が投稿したメッセージを読み、書き換える。
//! チャネルは利用者も編集できるため、順序保証は「最新 N 件」だけを仮定する。

use async_trait::async_trait;

use crate::domain::{Card, MessageId};

/// PostedMessage はシステムが投稿したメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub id: MessageId,
    pub card: Card,
}

/// ChannelError はチャネル操作の失敗
///
/// バックグラウンドループではログに残して次の tick に回す。
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("display channel unavailable: {0}")]
    Unavailable(String),

    #[error("message {0} no longer exists")]
    MessageGone(MessageId),
}

/// DisplayChannel は表示チャネルへの読み書き
#[async_trait]
pub trait DisplayChannel: Send + Sync {
    /// 直近 `limit` 件のうちシステムが投稿したもの（新しい順）
    async fn recent_own_messages(&self, limit: usize) -> Result<Vec<PostedMessage>, ChannelError>;

    /// 新規投稿
    async fn post(&self, card: &Card) -> Result<MessageId, ChannelError>;

    /// 既存メッセージの内容を置き換える
    async fn edit(&self, id: MessageId, card: &Card) -> Result<(), ChannelError>;
}
