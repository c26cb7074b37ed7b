//! Item records held by the three lists.
//!
//! An `Item` lives in exactly one list at a time. The list-specific wrappers
//! (`CatalogEntry`, `ScheduleEntry`, `ArchiveEntry`) add only the state that
//! list owns; moving between lists goes through `into_item()` so that vote
//! state and times never leak across a promotion.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::MarqueeError;
use super::ids::ActorId;

/// Compare two titles the way every list does: trimmed, case-insensitive.
pub fn same_title(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Common movie record.
///
/// Field names are the JSON keys of each stored entry. Documents are arrays of
/// entries; a title-keyed object is not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub release_year: String,
    pub runtime: String,
    pub recommended_by: ActorId,
    #[serde(default)]
    pub poster_url: Option<String>,
}

impl Item {
    pub fn new(
        title: impl Into<String>,
        release_year: impl Into<String>,
        runtime: impl Into<String>,
        recommended_by: ActorId,
    ) -> Self {
        Self {
            title: title.into(),
            release_year: release_year.into(),
            runtime: runtime.into(),
            recommended_by,
            poster_url: None,
        }
    }

    pub fn with_poster(mut self, poster_url: impl Into<String>) -> Self {
        self.poster_url = Some(poster_url.into());
        self
    }

    pub fn has_title(&self, title: &str) -> bool {
        same_title(&self.title, title)
    }
}

/// A proposed item with its vote state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub item: Item,
    pub votes: u32,
    #[serde(default)]
    pub voters: BTreeSet<ActorId>,
}

impl CatalogEntry {
    /// Fresh entry: no votes, no voters.
    pub fn new(item: Item) -> Self {
        Self {
            item,
            votes: 0,
            voters: BTreeSet::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.item.title
    }

    /// Count `actor`'s vote.
    ///
    /// Rejections leave the entry untouched.
    pub fn cast_vote(&mut self, actor: &ActorId) -> Result<u32, MarqueeError> {
        if self.voters.contains(actor) {
            return Err(MarqueeError::AlreadyVoted(self.item.title.clone()));
        }
        if *actor == self.item.recommended_by {
            return Err(MarqueeError::SelfVote(self.item.title.clone()));
        }
        self.voters.insert(actor.clone());
        self.votes += 1;
        Ok(self.votes)
    }

    /// Drop vote state for promotion.
    pub fn into_item(self) -> Item {
        self.item
    }
}

/// A committed item, optionally with a viewing time (unix seconds, UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(flatten)]
    pub item: Item,
    #[serde(
        rename = "time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_at: Option<i64>,
}

impl ScheduleEntry {
    pub fn new(item: Item) -> Self {
        Self {
            item,
            scheduled_at: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.item.title
    }

    /// The scheduled time truncated to whole minutes since the epoch.
    pub fn scheduled_minute(&self) -> Option<i64> {
        self.scheduled_at.map(|ts| ts.div_euclid(60))
    }

    pub fn scheduled_at_utc(&self) -> Option<DateTime<Utc>> {
        self.scheduled_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    }

    pub fn into_item(self) -> Item {
        self.item
    }
}

/// A completed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    #[serde(flatten)]
    pub item: Item,
}

impl ArchiveEntry {
    pub fn new(item: Item) -> Self {
        Self { item }
    }

    pub fn title(&self) -> &str {
        &self.item.title
    }
}
