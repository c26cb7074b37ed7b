//! Schedule: items committed to a viewing time.
//!
//! Titles are unique within the schedule (trimmed, case-insensitive).
//! Times are stored as unix seconds; the sweep compares them at minute
//! granularity in UTC.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::cell::{ListCell, ListDocument};
use crate::domain::{Item, ListKind, MarqueeError, ScheduleEntry};
use crate::ports::{DocumentStore, StoreError};

/// Accepted local time pattern (`DD-MM-YYYY HH:MM`).
pub const TIME_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Parse a local wall-clock time in `timezone` into unix seconds.
///
/// An ambiguous local time (DST fall-back) resolves to the earlier instant;
/// a non-existent one (DST gap) is a format error.
pub fn parse_local_time(local_time_text: &str, timezone: &str) -> Result<i64, MarqueeError> {
    let naive = NaiveDateTime::parse_from_str(local_time_text.trim(), TIME_FORMAT)
        .map_err(|_| MarqueeError::BadTimeFormat(local_time_text.to_string()))?;
    let tz = parse_timezone(timezone)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|at| at.timestamp())
        .ok_or_else(|| MarqueeError::BadTimeFormat(local_time_text.to_string()))
}

/// Validate an IANA timezone identifier.
pub fn parse_timezone(timezone: &str) -> Result<Tz, MarqueeError> {
    timezone
        .trim()
        .parse::<Tz>()
        .map_err(|_| MarqueeError::BadTimezone(timezone.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleList {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose title matches.
    pub fn find(&self, title: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.item.has_title(title))
    }

    pub fn contains(&self, title: &str) -> bool {
        self.find(title).is_some()
    }

    fn position(&self, title: &str) -> Result<usize, MarqueeError> {
        self.entries
            .iter()
            .position(|e| e.item.has_title(title))
            .ok_or_else(|| MarqueeError::not_found(ListKind::Schedule, title))
    }

    /// Insert without a time.
    pub fn admit(&mut self, item: Item) -> Result<ScheduleEntry, MarqueeError> {
        if self.contains(&item.title) {
            return Err(MarqueeError::DuplicateTitle(item.title));
        }
        let entry = ScheduleEntry::new(item);
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Set the viewing time of `title` from local time text in `timezone`.
    pub fn assign_time(
        &mut self,
        title: &str,
        local_time_text: &str,
        timezone: &str,
    ) -> Result<i64, MarqueeError> {
        let at = parse_local_time(local_time_text, timezone)?;
        let idx = self.position(title)?;
        self.entries[idx].scheduled_at = Some(at);
        Ok(at)
    }

    pub fn remove(&mut self, title: &str) -> Result<ScheduleEntry, MarqueeError> {
        self.pop(title)
    }

    pub fn pop(&mut self, title: &str) -> Result<ScheduleEntry, MarqueeError> {
        let idx = self.position(title)?;
        Ok(self.entries.remove(idx))
    }

    pub fn pop_all(&mut self) -> Vec<ScheduleEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Entries whose time falls in the same UTC minute as `instant`, in list order.
    pub fn due_at(&self, instant: DateTime<Utc>) -> Vec<ScheduleEntry> {
        let minute = instant.timestamp().div_euclid(60);
        self.entries
            .iter()
            .filter(|e| e.scheduled_minute() == Some(minute))
            .cloned()
            .collect()
    }

    /// Earliest time first, unscheduled entries last, ties in list order.
    pub fn ordered(&self) -> Vec<ScheduleEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|e| (e.scheduled_at.is_none(), e.scheduled_at));
        sorted
    }

    /// The earliest entry that has a time.
    pub fn next_scheduled(&self) -> Option<ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.scheduled_at.is_some())
            .min_by_key(|e| e.scheduled_at)
            .cloned()
    }

    pub fn clear(&mut self) -> usize {
        self.pop_all().len()
    }
}

#[async_trait]
impl ListDocument for ScheduleList {
    const DOCUMENT: &'static str = "schedule";

    async fn reload_from(&mut self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        self.entries = store.load_schedule().await?;
        Ok(())
    }

    async fn save_to(&self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        store.save_schedule(&self.entries).await
    }
}

/// Schedule manager.
pub type Schedule = ListCell<ScheduleList>;

impl ListCell<ScheduleList> {
    pub async fn admit(&self, item: Item) -> Result<ScheduleEntry, MarqueeError> {
        let entry = self.mutate(|list| list.admit(item)).await?;
        tracing::info!(title = %entry.title(), "admitted to schedule");
        Ok(entry)
    }

    pub async fn assign_time(
        &self,
        title: &str,
        local_time_text: &str,
        timezone: &str,
    ) -> Result<i64, MarqueeError> {
        let at = self
            .mutate(|list| list.assign_time(title, local_time_text, timezone))
            .await?;
        tracing::info!(title, timezone, scheduled_at = at, "time assigned");
        Ok(at)
    }

    pub async fn remove(&self, title: &str) -> Result<ScheduleEntry, MarqueeError> {
        let entry = self.mutate(|list| list.remove(title)).await?;
        tracing::info!(title = %entry.title(), "removed from schedule");
        Ok(entry)
    }

    pub async fn find(&self, title: &str) -> Result<Option<ScheduleEntry>, MarqueeError> {
        self.read(|list| list.find(title).cloned()).await
    }

    pub async fn due_at(&self, instant: DateTime<Utc>) -> Result<Vec<ScheduleEntry>, MarqueeError> {
        self.read(|list| list.due_at(instant)).await
    }

    pub async fn ordered(&self) -> Result<Vec<ScheduleEntry>, MarqueeError> {
        self.read(ScheduleList::ordered).await
    }

    pub async fn next_scheduled(&self) -> Result<Option<ScheduleEntry>, MarqueeError> {
        self.read(ScheduleList::next_scheduled).await
    }

    pub async fn clear(&self) -> Result<usize, MarqueeError> {
        let removed = self.mutate(|list| Ok(list.clear())).await?;
        tracing::info!(removed, "schedule cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActorId;
    use rstest::rstest;

    fn item(title: &str) -> Item {
        Item::new(title, "2021", "155 min", ActorId::new("alice"))
    }

    fn list_with(titles: &[&str]) -> ScheduleList {
        let mut list = ScheduleList::new();
        for title in titles {
            list.admit(item(title)).unwrap();
        }
        list
    }

    #[test]
    fn admit_rejects_duplicate_titles_case_insensitively() {
        let mut list = list_with(&["Dune"]);
        let err = list.admit(item("DUNE")).unwrap_err();
        assert_eq!(err, MarqueeError::DuplicateTitle("DUNE".into()));
        assert_eq!(list.len(), 1);
        assert_eq!(list.find("dune").unwrap().scheduled_at, None);
    }

    #[test]
    fn assign_time_in_new_york_stores_utc_epoch() {
        let mut list = list_with(&["Dune"]);
        let at = list
            .assign_time("dune", "25-12-2030 18:00", "America/New_York")
            .unwrap();
        let expected = Utc.with_ymd_and_hms(2030, 12, 25, 23, 0, 0).unwrap();
        assert_eq!(at, expected.timestamp());
        assert_eq!(list.find("Dune").unwrap().scheduled_at, Some(at));
    }

    #[rstest]
    #[case::bad_format("2030-12-25 18:00", "UTC", MarqueeError::BadTimeFormat("2030-12-25 18:00".into()))]
    #[case::bad_zone("25-12-2030 18:00", "Mars/Olympus", MarqueeError::BadTimezone("Mars/Olympus".into()))]
    #[case::missing_title_checked_last("25-12-2030 18:00", "UTC", MarqueeError::not_found(ListKind::Schedule, "Arrival"))]
    fn assign_time_failures(
        #[case] text: &str,
        #[case] zone: &str,
        #[case] expected: MarqueeError,
    ) {
        let mut list = list_with(&["Dune"]);
        let title = if matches!(expected, MarqueeError::NotFound { .. }) {
            "Arrival"
        } else {
            "Dune"
        };
        assert_eq!(list.assign_time(title, text, zone).unwrap_err(), expected);
        assert_eq!(list.find("Dune").unwrap().scheduled_at, None);
    }

    #[test]
    fn nonexistent_local_time_is_rejected() {
        let mut list = list_with(&["Dune"]);
        // 2030-03-10 02:30 does not exist in New York (spring forward)
        let err = list
            .assign_time("Dune", "10-03-2030 02:30", "America/New_York")
            .unwrap_err();
        assert!(matches!(err, MarqueeError::BadTimeFormat(_)));
    }

    #[test]
    fn due_at_matches_on_the_minute() {
        let mut list = list_with(&["Dune", "Arrival", "Heat"]);
        list.assign_time("Dune", "25-12-2030 18:00", "UTC").unwrap();
        list.assign_time("Heat", "25-12-2030 18:00", "UTC").unwrap();
        list.assign_time("Arrival", "25-12-2030 18:01", "UTC").unwrap();

        let now = Utc.with_ymd_and_hms(2030, 12, 25, 18, 0, 42).unwrap();
        let due: Vec<_> = list.due_at(now).iter().map(|e| e.title().to_string()).collect();
        assert_eq!(due, vec!["Dune", "Heat"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn ordered_puts_unscheduled_last_and_keeps_ties_stable() {
        let mut list = list_with(&["Unset A", "Late", "Early", "Unset B", "Early Too"]);
        list.assign_time("Late", "26-12-2030 20:00", "UTC").unwrap();
        list.assign_time("Early", "25-12-2030 20:00", "UTC").unwrap();
        list.assign_time("Early Too", "25-12-2030 20:00", "UTC").unwrap();

        let titles: Vec<_> = list.ordered().iter().map(|e| e.title().to_string()).collect();
        assert_eq!(titles, vec!["Early", "Early Too", "Late", "Unset A", "Unset B"]);
        assert_eq!(list.next_scheduled().unwrap().title(), "Early");
    }

    #[test]
    fn remove_twice_reports_not_found() {
        let mut list = list_with(&["Dune"]);
        assert!(list.remove("Dune").is_ok());
        assert!(matches!(
            list.remove("Dune"),
            Err(MarqueeError::NotFound { list: ListKind::Schedule, .. })
        ));
    }
}
