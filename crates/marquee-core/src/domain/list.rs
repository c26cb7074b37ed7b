//! ListKind - 3 つのリストの識別子
//!
//! # 状態遷移
//! - Catalog → Schedule（昇格）
//! - Schedule → Archive（手動 / 時刻到来）
//! - Catalog → Archive（確認付き）

use std::fmt;

use serde::{Deserialize, Serialize};

/// ListKind はリスト（= 表示ビュー）の種類
///
/// ロック順序もこの宣言順（Catalog → Schedule → Archive）に従う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Catalog,
    Schedule,
    Archive,
}

impl ListKind {
    /// Publish ループが巡回する順序
    pub const CYCLE: [ListKind; 3] = [ListKind::Catalog, ListKind::Schedule, ListKind::Archive];

    /// 巡回順で次のビュー
    pub fn next(self) -> Self {
        match self {
            ListKind::Catalog => ListKind::Schedule,
            ListKind::Schedule => ListKind::Archive,
            ListKind::Archive => ListKind::Catalog,
        }
    }

    /// 表示用の見出し
    pub fn heading(self) -> &'static str {
        match self {
            ListKind::Catalog => "Movie Recommendations",
            ListKind::Schedule => "Movie Queue",
            ListKind::Archive => "Movies Watched list",
        }
    }

    /// 空のときの表示文言
    pub fn empty_text(self) -> &'static str {
        match self {
            ListKind::Catalog => "No movies recommended yet.",
            ListKind::Schedule => "The queue is empty.",
            ListKind::Archive => "The watchlist is empty.",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListKind::Catalog => "recommendations",
            ListKind::Schedule => "queue",
            ListKind::Archive => "watchlist",
        };
        f.write_str(name)
    }
}
