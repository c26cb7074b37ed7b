//! CommandService - コマンド面
//!
//! 外部のコマンドルーターが解析済みの `Command` を渡す。
//! 管理者専用コマンドの権限判定と、エラーから返信文への変換はここで行う。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::app::coordinator::{LifecycleCoordinator, WatchedFrom};
use crate::config::MarqueeConfig;
use crate::domain::{ActorId, Card, ErrorKind, ListKind, MarqueeError};
use crate::lists::Proposal;
use crate::render::{self, format_time};

/// 呼び出し元の情報（権限は外部から与えられる単一の述語）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub actor: ActorId,
    pub is_admin: bool,
}

impl CommandContext {
    pub fn member(actor: impl Into<ActorId>) -> Self {
        Self {
            actor: actor.into(),
            is_admin: false,
        }
    }

    pub fn admin(actor: impl Into<ActorId>) -> Self {
        Self {
            actor: actor.into(),
            is_admin: true,
        }
    }
}

/// Command は解析済みのライフサイクル操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Propose { query: String },
    Vote { title: String },
    Withdraw { title: String },
    Schedule { title: String },
    SetTime { title: String, local_time: String },
    SetTimezone { timezone: String },
    Unschedule { title: String },
    Watched { query: String },
    Forget { title: String },
    Clear { list: ListKind },
    ShowTop,
    ShowSchedule,
    ShowRecent,
    NextUp,
    Announce { title: String },
}

impl Command {
    /// 管理者だけが実行できるか
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Command::Schedule { .. }
                | Command::SetTime { .. }
                | Command::Unschedule { .. }
                | Command::Watched { .. }
                | Command::Forget { .. }
                | Command::Clear { .. }
                | Command::Announce { .. }
        )
    }

    fn name(&self) -> &'static str {
        match self {
            Command::Propose { .. } => "propose",
            Command::Vote { .. } => "vote",
            Command::Withdraw { .. } => "withdraw",
            Command::Schedule { .. } => "schedule",
            Command::SetTime { .. } => "set_time",
            Command::SetTimezone { .. } => "set_timezone",
            Command::Unschedule { .. } => "unschedule",
            Command::Watched { .. } => "watched",
            Command::Forget { .. } => "forget",
            Command::Clear { .. } => "clear",
            Command::ShowTop => "show_top",
            Command::ShowSchedule => "show_schedule",
            Command::ShowRecent => "show_recent",
            Command::NextUp => "next_up",
            Command::Announce { .. } => "announce",
        }
    }
}

/// Reply は呼び出し元へ返す内容（本文 + 任意のカード）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(skip)]
    pub failure: Option<ErrorKind>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            card: None,
            failure: None,
        }
    }

    pub fn card(text: impl Into<String>, card: Card) -> Self {
        Self {
            card: Some(card),
            ..Self::text(text)
        }
    }

    fn failed(err: &MarqueeError) -> Self {
        Self {
            failure: Some(err.kind()),
            ..Self::text(err.to_string())
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

pub struct CommandService {
    coordinator: Arc<LifecycleCoordinator>,
    top_n: usize,
    recent_n: usize,
}

impl CommandService {
    pub fn new(coordinator: Arc<LifecycleCoordinator>, config: &MarqueeConfig) -> Self {
        Self {
            coordinator,
            top_n: config.top_n,
            recent_n: config.recent_n,
        }
    }

    pub fn coordinator(&self) -> &Arc<LifecycleCoordinator> {
        &self.coordinator
    }

    /// コマンドを実行し、成功・失敗どちらも返信に変換する
    pub async fn execute(&self, ctx: &CommandContext, command: Command) -> Reply {
        let name = command.name();
        match self.dispatch(ctx, command).await {
            Ok(reply) => reply,
            Err(err) => {
                match err.kind() {
                    ErrorKind::Infrastructure => {
                        tracing::warn!(command = name, actor = %ctx.actor, error = %err, "command failed")
                    }
                    _ => tracing::info!(command = name, actor = %ctx.actor, error = %err, "command rejected"),
                }
                Reply::failed(&err)
            }
        }
    }

    async fn dispatch(&self, ctx: &CommandContext, command: Command) -> Result<Reply, MarqueeError> {
        if command.requires_admin() && !ctx.is_admin {
            return Err(MarqueeError::NotOwner(command.name().to_string()));
        }
        let c = &self.coordinator;
        let actor = &ctx.actor;

        Ok(match command {
            Command::Propose { query } => {
                let proposed = c.propose(actor, &query).await?;
                match proposed.proposal {
                    Proposal::Created(entry) => Reply::card(
                        format!("`{}` has been added to the recommendations!", entry.title()),
                        render::proposal_card(&proposed.record, actor, entry.votes),
                    ),
                    Proposal::Voted { title, votes } => Reply::text(format!(
                        "You've voted for `{title}`. It now has {votes} votes."
                    )),
                }
            }
            Command::Vote { title } => {
                let votes = c.catalog().vote(&title, actor).await?;
                Reply::text(format!(
                    "Thank you! You've voted for `{title}`. It now has {votes} votes."
                ))
            }
            Command::Withdraw { title } => {
                let entry = c.catalog().remove(&title, actor, ctx.is_admin).await?;
                Reply::text(format!(
                    "`{}` has been removed from the recommendations.",
                    entry.title()
                ))
            }
            Command::Schedule { title } => {
                let entry = c.promote_to_schedule(&title).await?;
                Reply::text(format!(
                    "The movie `{}` has been added to the queue.",
                    entry.title()
                ))
            }
            Command::SetTime { title, local_time } => {
                let at = c.assign_time(actor, &title, &local_time).await?;
                Reply::text(format!(
                    "`{title}` is scheduled for {}.",
                    format_time(at)
                ))
            }
            Command::SetTimezone { timezone } => {
                let name = c.timezones().set_timezone(actor, &timezone).await?;
                Reply::text(format!("Your timezone has been set to `{name}`."))
            }
            Command::Unschedule { title } => {
                let entry = c.schedule().remove(&title).await?;
                Reply::text(format!(
                    "The movie `{}` has been removed from the queue.",
                    entry.title()
                ))
            }
            Command::Watched { query } => {
                let watched = c.mark_watched(actor, &query).await?;
                let title = watched.entry.title();
                Reply::text(match watched.from {
                    WatchedFrom::Schedule => {
                        format!("The movie `{title}` has been moved from the queue to the watchlist.")
                    }
                    WatchedFrom::Catalog => format!(
                        "The movie `{title}` has been moved from recommendations to the watchlist."
                    ),
                    WatchedFrom::Lookup => {
                        format!("The movie `{title}` has been added to the watchlist.")
                    }
                })
            }
            Command::Forget { title } => {
                let entry = c.archive().remove(&title).await?;
                Reply::text(format!(
                    "The movie `{}` has been removed from the watchlist.",
                    entry.title()
                ))
            }
            Command::Clear { list } => {
                let removed = match list {
                    ListKind::Catalog => c.catalog().clear().await?,
                    ListKind::Schedule => c.schedule().clear().await?,
                    ListKind::Archive => c.archive().clear().await?,
                };
                Reply::text(format!("The {list} has been cleared ({removed} removed)."))
            }
            Command::ShowTop => {
                let top = c.catalog().top_n(self.top_n).await?;
                Reply::card(ListKind::Catalog.heading(), render::top_card(&top))
            }
            Command::ShowSchedule => {
                let ordered = c.schedule().ordered().await?;
                Reply::card(ListKind::Schedule.heading(), render::schedule_card(&ordered))
            }
            Command::ShowRecent => {
                let recent = c.archive().recent_n(self.recent_n).await?;
                Reply::card(ListKind::Archive.heading(), render::recent_card(&recent))
            }
            Command::NextUp => match c.next_up().await? {
                Some(entry) => Reply::card("Next up", render::next_up_card(&entry)),
                None => Reply::text("No upcoming movies are scheduled in the queue."),
            },
            Command::Announce { title } => {
                let card = c.announce(&title).await?;
                Reply::card(format!("Announcing `{title}`."), card)
            }
        })
    }
}
