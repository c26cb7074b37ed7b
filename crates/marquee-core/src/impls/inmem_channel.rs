//! InMemoryChannel - テスト・デモ用の DisplayChannel
//!
//! 他の利用者の投稿（`push_foreign`）や障害（`set_available(false)`）を
//! 再現できる。メッセージ ID は ULID で生成順に並ぶ。

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::{Card, MessageId};
use crate::ports::{ChannelError, DisplayChannel, PostedMessage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub id: MessageId,
    pub card: Card,
    pub own: bool,
}

#[derive(Debug)]
struct ChannelState {
    messages: Vec<ChannelMessage>,
    available: bool,
    edits: usize,
}

/// InMemoryChannel は投稿順にメッセージを保持する
#[derive(Debug)]
pub struct InMemoryChannel {
    state: Mutex<ChannelState>,
}

impl InMemoryChannel {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState {
                messages: Vec::new(),
                available: true,
                edits: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_available(&self, available: bool) {
        self.state().available = available;
    }

    /// 他の利用者の投稿を追加
    pub fn push_foreign(&self, text: impl Into<String>) -> MessageId {
        let id = MessageId::generate();
        self.state().messages.push(ChannelMessage {
            id,
            card: Card::new(text),
            own: false,
        });
        id
    }

    /// メッセージを削除（利用者による削除の再現）
    pub fn delete(&self, id: MessageId) {
        self.state().messages.retain(|m| m.id != id);
    }

    /// 全メッセージ（古い順）
    pub fn messages(&self) -> Vec<ChannelMessage> {
        self.state().messages.clone()
    }

    /// システム自身の投稿（古い順）
    pub fn own_cards(&self) -> Vec<Card> {
        self.state()
            .messages
            .iter()
            .filter(|m| m.own)
            .map(|m| m.card.clone())
            .collect()
    }

    pub fn edit_count(&self) -> usize {
        self.state().edits
    }

    fn ensure_available(state: &ChannelState) -> Result<(), ChannelError> {
        if state.available {
            Ok(())
        } else {
            Err(ChannelError::Unavailable("channel offline".into()))
        }
    }
}

impl Default for InMemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DisplayChannel for InMemoryChannel {
    async fn recent_own_messages(&self, limit: usize) -> Result<Vec<PostedMessage>, ChannelError> {
        let state = self.state();
        Self::ensure_available(&state)?;
        Ok(state
            .messages
            .iter()
            .rev()
            .take(limit)
            .filter(|m| m.own)
            .map(|m| PostedMessage {
                id: m.id,
                card: m.card.clone(),
            })
            .collect())
    }

    async fn post(&self, card: &Card) -> Result<MessageId, ChannelError> {
        let mut state = self.state();
        Self::ensure_available(&state)?;
        let id = MessageId::generate();
        state.messages.push(ChannelMessage {
            id,
            card: card.clone(),
            own: true,
        });
        Ok(id)
    }

    async fn edit(&self, id: MessageId, card: &Card) -> Result<(), ChannelError> {
        let mut state = self.state();
        Self::ensure_available(&state)?;
        let message = state
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.own)
            .ok_or(ChannelError::MessageGone(id))?;
        message.card = card.clone();
        state.edits += 1;
        Ok(())
    }
}
