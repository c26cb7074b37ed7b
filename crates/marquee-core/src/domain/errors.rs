//! Errors - エラー型と分類
//!
//! すべての操作はこの `MarqueeError` で失敗を返す。
//! `Display` の文言はそのまま利用者への返信として使われる。

use chrono::DateTime;
use thiserror::Error;

use super::list::ListKind;

/// ErrorKind は失敗の運用分類
///
/// - Rejected: ルール違反。状態は変わっていない
/// - Cancelled: 利用者が確認を拒否、または時間切れ
/// - Infrastructure: 永続化ストアの障害
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Rejected,
    Cancelled,
    Infrastructure,
}

/// MarqueeError はドメインエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarqueeError {
    #[error("`{title}` is not in the {list}.")]
    NotFound { list: ListKind, title: String },

    #[error("`{0}` is already in the queue.")]
    DuplicateTitle(String),

    #[error(
        "The recommendations list is full ({capacity} movies). Please wait until some movies are removed before recommending more."
    )]
    CapacityExceeded { capacity: usize },

    #[error("The movie `{title}` is already in queue{}", scheduled_suffix(.scheduled_at))]
    AlreadyScheduled {
        title: String,
        scheduled_at: Option<i64>,
    },

    #[error("`{0}` has already been watched. Ask admins for rewatching.")]
    AlreadyArchived(String),

    #[error("You've already voted for `{0}`. You can only vote once.")]
    AlreadyVoted(String),

    #[error("You cannot vote for your own recommendation, `{0}`.")]
    SelfVote(String),

    #[error("You cannot change `{0}` because you did not recommend it.")]
    NotOwner(String),

    #[error("Invalid time format `{0}`. Please use `DD-MM-YYYY HH:MM`.")]
    BadTimeFormat(String),

    #[error("Invalid timezone: `{0}`. Please use a valid timezone.")]
    BadTimezone(String),

    #[error("Sorry, I couldn't find `{0}`.")]
    LookupFailed(String),

    #[error("No confirmation for `{0}`. Action cancelled.")]
    Cancelled(String),

    #[error("Storage is unavailable, nothing was changed: {0}")]
    StoreUnavailable(String),
}

fn scheduled_suffix(scheduled_at: &Option<i64>) -> String {
    match scheduled_at.and_then(|ts| DateTime::from_timestamp(ts, 0)) {
        Some(at) => format!(" scheduled at {}.", at.format("%Y-%m-%d %H:%M UTC")),
        None => ", not scheduled yet.".to_string(),
    }
}

impl MarqueeError {
    pub fn not_found(list: ListKind, title: impl Into<String>) -> Self {
        Self::NotFound {
            list,
            title: title.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::StoreUnavailable(_) => ErrorKind::Infrastructure,
            _ => ErrorKind::Rejected,
        }
    }
}
