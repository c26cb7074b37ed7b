//! Card rendering for list views, proposals and announcements.
//!
//! Pure functions over snapshots; nothing here touches a lock or a port.

use chrono::DateTime;

use crate::domain::{
    ActorId, ArchiveEntry, Card, CatalogEntry, Item, ListKind, ScheduleEntry,
};
use crate::ports::LookupRecord;

/// A consistent snapshot of one list, taken under its lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    /// Already sorted by votes.
    Catalog(Vec<CatalogEntry>),
    /// Already in time order.
    Schedule(Vec<ScheduleEntry>),
    /// Most recent last.
    Archive(Vec<ArchiveEntry>),
}

impl ListView {
    pub fn kind(&self) -> ListKind {
        match self {
            ListView::Catalog(_) => ListKind::Catalog,
            ListView::Schedule(_) => ListKind::Schedule,
            ListView::Archive(_) => ListKind::Archive,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ListView::Catalog(entries) => entries.is_empty(),
            ListView::Schedule(entries) => entries.is_empty(),
            ListView::Archive(entries) => entries.is_empty(),
        }
    }
}

/// `YYYY-MM-DD HH:MM UTC`, or the raw number if out of range.
pub fn format_time(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn item_lines(item: &Item) -> String {
    format!(
        "Release year: {}\nRuntime: {}\nRecommended by: {}\n",
        item.release_year, item.runtime, item.recommended_by
    )
}

fn catalog_block(entry: &CatalogEntry) -> String {
    format!(
        "**{}**\n{}Votes: {}\n",
        entry.title(),
        item_lines(&entry.item),
        entry.votes
    )
}

fn schedule_block(entry: &ScheduleEntry) -> String {
    let mut block = format!("**{}**\n{}", entry.title(), item_lines(&entry.item));
    if let Some(ts) = entry.scheduled_at {
        block.push_str(&format!("Scheduled at: {}\n", format_time(ts)));
    }
    block
}

fn archive_block(entry: &ArchiveEntry) -> String {
    format!("**{}**\n{}", entry.title(), item_lines(&entry.item))
}

/// The single-message summary the publish loop keeps up to date.
pub fn summary_card(view: &ListView) -> Card {
    let kind = view.kind();
    let card = Card::new(kind.heading());
    if view.is_empty() {
        return card.description(kind.empty_text());
    }
    let blocks: Vec<String> = match view {
        ListView::Catalog(entries) => entries.iter().map(catalog_block).collect(),
        ListView::Schedule(entries) => entries.iter().map(schedule_block).collect(),
        ListView::Archive(entries) => entries.iter().map(archive_block).collect(),
    };
    card.description(blocks.join("\n"))
}

fn numbered(card: Card, index: usize, title: &str, value: String) -> Card {
    card.field(format!("{}. {}", index + 1, title), value)
}

pub fn top_card(entries: &[CatalogEntry]) -> Card {
    if entries.is_empty() {
        return Card::new(ListKind::Catalog.heading())
            .description("No recommendations available at the moment.");
    }
    entries.iter().enumerate().fold(
        Card::new(format!("Top {} Movie Recommendations", entries.len())),
        |card, (i, entry)| {
            numbered(
                card,
                i,
                entry.title(),
                format!("{}Votes: {}", item_lines(&entry.item), entry.votes),
            )
        },
    )
}

pub fn schedule_card(entries: &[ScheduleEntry]) -> Card {
    if entries.is_empty() {
        return Card::new(ListKind::Schedule.heading())
            .description(ListKind::Schedule.empty_text());
    }
    entries
        .iter()
        .enumerate()
        .fold(Card::new(ListKind::Schedule.heading()), |card, (i, entry)| {
            let when = match entry.scheduled_at {
                Some(ts) => format!("Scheduled at: {}", format_time(ts)),
                None => "Movie not scheduled yet".to_string(),
            };
            numbered(card, i, entry.title(), format!("{}{when}", item_lines(&entry.item)))
        })
}

pub fn recent_card(entries: &[ArchiveEntry]) -> Card {
    if entries.is_empty() {
        return Card::new("Movies Watched List").description(ListKind::Archive.empty_text());
    }
    entries
        .iter()
        .enumerate()
        .fold(Card::new("Movies Watched List"), |card, (i, entry)| {
            numbered(card, i, entry.title(), item_lines(&entry.item))
        })
}

/// Card returned after a new recommendation is created.
pub fn proposal_card(record: &LookupRecord, actor: &ActorId, votes: u32) -> Card {
    let mut card = Card::new(&record.title)
        .description(
            record
                .plot
                .clone()
                .unwrap_or_else(|| "No plot information available.".to_string()),
        )
        .field("Runtime", &record.runtime)
        .field("Release Year", &record.release_year)
        .field("Recommended By", actor.as_str());
    if let Some(url) = record.external_url() {
        card = card.field("IMDb", url);
    }
    card.image(record.poster_url.clone())
        .footer(format!("Votes: {votes}"))
}

/// Announcement posted when a scheduled entry comes due.
pub fn now_playing_card(entry: &ScheduleEntry) -> Card {
    let item = &entry.item;
    Card::new("Now Playing")
        .description(format!(
            "**{}** (Released: {})\nRuntime: {}\nRecommended by: {}",
            item.title, item.release_year, item.runtime, item.recommended_by
        ))
        .image(item.poster_url.clone())
}

pub fn next_up_card(entry: &ScheduleEntry) -> Card {
    let item = &entry.item;
    let mut description = format!("**{}**\n{}", item.title, item_lines(item));
    if let Some(ts) = entry.scheduled_at {
        description.push_str(&format!("Scheduled at: {}\n", format_time(ts)));
    }
    Card::new("Next Upcoming Movie")
        .description(description)
        .image(item.poster_url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str) -> Item {
        Item::new(title, "2021", "155 min", ActorId::new("alice"))
    }

    #[test]
    fn empty_views_use_list_specific_text() {
        let card = summary_card(&ListView::Schedule(Vec::new()));
        assert_eq!(card.title, "Movie Queue");
        assert_eq!(card.description, "The queue is empty.");
    }

    #[test]
    fn schedule_summary_shows_time_only_when_set() {
        let mut timed = ScheduleEntry::new(item("Dune"));
        timed.scheduled_at = Some(1_924_988_400);
        let untimed = ScheduleEntry::new(item("Arrival"));
        let card = summary_card(&ListView::Schedule(vec![timed, untimed]));
        assert!(card.description.contains("Scheduled at: 2030-12-25 23:00 UTC"));
        assert_eq!(card.description.matches("Scheduled at").count(), 1);
    }

    #[test]
    fn top_card_numbers_entries() {
        let mut a = CatalogEntry::new(item("A"));
        a.votes = 3;
        let card = top_card(&[a, CatalogEntry::new(item("B"))]);
        assert_eq!(card.title, "Top 2 Movie Recommendations");
        assert_eq!(card.fields[0].name, "1. A");
        assert!(card.fields[0].value.ends_with("Votes: 3"));
        assert_eq!(card.fields[1].name, "2. B");
    }

    #[test]
    fn proposal_card_links_external_id() {
        let mut record = LookupRecord::new("Dune", "2021", "155 min");
        record.external_id = Some("tt1160419".into());
        let card = proposal_card(&record, &ActorId::new("alice"), 0);
        assert!(card.fields.iter().any(|f| f.value == "https://www.imdb.com/title/tt1160419/"));
        assert_eq!(card.footer.as_deref(), Some("Votes: 0"));
    }
}
