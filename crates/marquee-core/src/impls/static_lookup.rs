//! StaticLookup / ScriptedConfirmer - 外部協調者の固定実装
//!
//! 本物の作品データベースや確認 UI の代わりに、テストと CLI で使う。

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ActorId;
use crate::ports::{Confirmation, Confirmer, LookupError, LookupRecord, MovieLookup};

/// StaticLookup は登録済みレコードだけを返す
///
/// 問い合わせは前後空白と大文字小文字を無視して照合し、
/// 返すタイトルは登録時の正規タイトル。
#[derive(Debug, Default)]
pub struct StaticLookup {
    records: HashMap<String, LookupRecord>,
    offline: bool,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// `record` を自身のタイトルで登録
    pub fn with(mut self, record: LookupRecord) -> Self {
        self.records.insert(key(&record.title), record);
        self
    }

    /// 別名で同じレコードを引けるようにする
    pub fn alias(mut self, query: &str, canonical: &str) -> Self {
        if let Some(record) = self.records.get(&key(canonical)).cloned() {
            self.records.insert(key(query), record);
        }
        self
    }

    /// サービス停止を再現
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }
}

fn key(title: &str) -> String {
    title.trim().to_lowercase()
}

#[async_trait]
impl MovieLookup for StaticLookup {
    async fn lookup(&self, query: &str) -> Result<LookupRecord, LookupError> {
        if self.offline {
            return Err(LookupError::Unavailable("lookup offline".into()));
        }
        self.records
            .get(&key(query))
            .cloned()
            .ok_or_else(|| LookupError::NotFound(query.to_string()))
    }
}

/// ScriptedConfirmer は用意された返答を順に返す（尽きたら `fallback`）
#[derive(Debug)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<Confirmation>>,
    fallback: Confirmation,
    delay: Option<Duration>,
}

impl ScriptedConfirmer {
    pub fn new(answers: impl IntoIterator<Item = Confirmation>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            fallback: Confirmation::Declined,
            delay: None,
        }
    }

    pub fn always(answer: Confirmation) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            fallback: answer,
            delay: None,
        }
    }

    /// 返答前に待つ（呼び出し側のタイムアウト検証用）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, actor: &ActorId, prompt: &str) -> Confirmation {
        tracing::debug!(actor = %actor, prompt, "confirmation requested");
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(self.fallback)
    }
}
