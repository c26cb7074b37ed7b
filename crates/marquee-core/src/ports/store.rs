//! DocumentStore port - 永続化ストア（正本 / source of truth）
//!
//! 4 つの文書をそれぞれ丸ごと読み書きする：
//! - catalog（推薦リスト）
//! - schedule（上映予定）
//! - archive（視聴済み）
//! - timezones（actor → タイムゾーン）
//!
//! # 設計原則
//! - 部分読み書きはしない（文書単位のみ）
//! - 文書が存在しない = 空のコレクション（エラーではない）
//! - 保存が失敗したら呼び出し側はメモリ上の変更を適用しない

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{ActorId, ArchiveEntry, CatalogEntry, MarqueeError, ScheduleEntry};

/// StoreError は永続化 I/O の失敗
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {document}: {source}")]
    Io {
        document: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {document} document: {source}")]
    Malformed {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for MarqueeError {
    fn from(err: StoreError) -> Self {
        MarqueeError::StoreUnavailable(err.to_string())
    }
}

/// Actor ごとのタイムゾーン設定
pub type TimezoneMap = BTreeMap<ActorId, String>;

/// DocumentStore は 3 つのリストとタイムゾーン表を保存する
///
/// # Thread Safety
/// - `Send + Sync` を要求（各リストのロック下から並行に呼ばれる）
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError>;
    async fn save_catalog(&self, entries: &[CatalogEntry]) -> Result<(), StoreError>;

    async fn load_schedule(&self) -> Result<Vec<ScheduleEntry>, StoreError>;
    async fn save_schedule(&self, entries: &[ScheduleEntry]) -> Result<(), StoreError>;

    async fn load_archive(&self) -> Result<Vec<ArchiveEntry>, StoreError>;
    async fn save_archive(&self, entries: &[ArchiveEntry]) -> Result<(), StoreError>;

    async fn load_timezones(&self) -> Result<TimezoneMap, StoreError>;
    async fn save_timezones(&self, timezones: &TimezoneMap) -> Result<(), StoreError>;
}
