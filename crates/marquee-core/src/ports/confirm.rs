//! Confirmer port - 操作前の確認
//!
//! 確認待ちの間、コーディネータはどのリストのロックも保持しない。
//! 戻ってきた時点で前提条件を再検証する（事前の読み取りはヒント扱い）。

use async_trait::async_trait;

use crate::domain::ActorId;

/// Confirmation は確認結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
    TimedOut,
}

impl Confirmation {
    pub fn is_confirmed(self) -> bool {
        matches!(self, Confirmation::Confirmed)
    }
}

/// Confirmer は `actor` に `prompt` を提示して返答を待つ
///
/// 実装が独自のタイムアウトを持たなくても、呼び出し側が
/// `tokio::time::timeout` で上限をかける。
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, actor: &ActorId, prompt: &str) -> Confirmation;
}
