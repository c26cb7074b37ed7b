//! MovieLookup port - 作品情報の検索
//!
//! 自由入力のタイトルから正規化されたレコードを引く。
//! 正規化タイトル（`LookupRecord::title`）が全リストのキーになる。

use async_trait::async_trait;

use crate::domain::{ActorId, Item};

/// LookupRecord は検索結果の正規化レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRecord {
    pub title: String,
    pub runtime: String,
    pub poster_url: Option<String>,
    pub release_year: String,
    pub plot: Option<String>,
    pub external_id: Option<String>,
}

impl LookupRecord {
    pub fn new(
        title: impl Into<String>,
        release_year: impl Into<String>,
        runtime: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            runtime: runtime.into(),
            poster_url: None,
            release_year: release_year.into(),
            plot: None,
            external_id: None,
        }
    }

    /// `actor` を推薦者とする Item に変換
    pub fn to_item(&self, actor: &ActorId) -> Item {
        Item {
            title: self.title.clone(),
            release_year: self.release_year.clone(),
            runtime: self.runtime.clone(),
            recommended_by: actor.clone(),
            poster_url: self.poster_url.clone(),
        }
    }

    /// 外部サイトへのリンク（external_id がある場合）
    pub fn external_url(&self) -> Option<String> {
        self.external_id
            .as_ref()
            .map(|id| format!("https://www.imdb.com/title/{id}/"))
    }
}

/// LookupError は検索の失敗
///
/// どちらの場合も操作は `LookupFailed` で中断され、状態は変わらない。
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no match for {0}")]
    NotFound(String),

    #[error("lookup service unavailable: {0}")]
    Unavailable(String),
}

/// MovieLookup は自由入力タイトルを正規化レコードに解決する
#[async_trait]
pub trait MovieLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<LookupRecord, LookupError>;
}
