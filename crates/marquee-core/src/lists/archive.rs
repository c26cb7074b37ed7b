//! Archive: watched items, append-only apart from explicit removal and clear.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::cell::{ListCell, ListDocument};
use crate::domain::{ArchiveEntry, Item, ListKind, MarqueeError, same_title};
use crate::ports::{DocumentStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct ArchiveList {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<ArchiveEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, item: Item) -> ArchiveEntry {
        let entry = ArchiveEntry::new(item);
        self.entries.push(entry.clone());
        entry
    }

    /// Remove the first entry whose title is exactly `title`.
    pub fn remove(&mut self, title: &str) -> Result<ArchiveEntry, MarqueeError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.title() == title)
            .ok_or_else(|| MarqueeError::not_found(ListKind::Archive, title))?;
        Ok(self.entries.remove(idx))
    }

    pub fn titles(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.title().to_string()).collect()
    }

    /// Re-recommendation guard; case-insensitive like the other lists.
    pub fn contains(&self, title: &str) -> bool {
        self.entries.iter().any(|e| same_title(e.title(), title))
    }

    /// Last `n` entries in append order (most recent last).
    pub fn recent_n(&self, n: usize) -> Vec<ArchiveEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries[skip..].to_vec()
    }

    pub fn clear(&mut self) -> usize {
        std::mem::take(&mut self.entries).len()
    }
}

#[async_trait]
impl ListDocument for ArchiveList {
    const DOCUMENT: &'static str = "archive";

    async fn reload_from(&mut self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        self.entries = store.load_archive().await?;
        Ok(())
    }

    async fn save_to(&self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        store.save_archive(&self.entries).await
    }
}

/// Archive manager.
pub type Archive = ListCell<ArchiveList>;

impl ListCell<ArchiveList> {
    pub async fn remove(&self, title: &str) -> Result<ArchiveEntry, MarqueeError> {
        let entry = self.mutate(|list| list.remove(title)).await?;
        tracing::info!(title, "removed from archive");
        Ok(entry)
    }

    pub async fn titles(&self) -> Result<BTreeSet<String>, MarqueeError> {
        self.read(ArchiveList::titles).await
    }

    pub async fn recent_n(&self, n: usize) -> Result<Vec<ArchiveEntry>, MarqueeError> {
        self.read(|list| list.recent_n(n)).await
    }

    pub async fn clear(&self) -> Result<usize, MarqueeError> {
        let removed = self.mutate(|list| Ok(list.clear())).await?;
        tracing::info!(removed, "archive cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActorId;
    use rstest::rstest;

    fn archive_of(titles: &[&str]) -> ArchiveList {
        let mut list = ArchiveList::new();
        for title in titles {
            list.append(Item::new(*title, "1995", "170 min", ActorId::new("a")));
        }
        list
    }

    #[rstest]
    #[case(0, &[])]
    #[case(2, &["C", "D"])]
    #[case(10, &["A", "B", "C", "D"])]
    fn recent_n_keeps_append_order(#[case] n: usize, #[case] expected: &[&str]) {
        let list = archive_of(&["A", "B", "C", "D"]);
        let titles: Vec<_> = list.recent_n(n).iter().map(|e| e.title().to_string()).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn remove_uses_exact_title_and_first_match() {
        let mut list = archive_of(&["Heat", "Alien", "Heat"]);
        assert!(matches!(
            list.remove("heat"),
            Err(MarqueeError::NotFound { list: ListKind::Archive, .. })
        ));
        list.remove("Heat").unwrap();
        let titles: Vec<_> = list.entries().iter().map(|e| e.title()).collect();
        assert_eq!(titles, vec!["Alien", "Heat"]);
    }

    #[test]
    fn contains_ignores_case_and_titles_lists_all() {
        let list = archive_of(&["Heat", "Alien"]);
        assert!(list.contains("  heat "));
        assert!(!list.contains("Dune"));
        assert_eq!(
            list.titles(),
            BTreeSet::from(["Alien".to_string(), "Heat".to_string()])
        );
    }

    #[test]
    fn clear_reports_count() {
        let mut list = archive_of(&["Heat", "Alien"]);
        assert_eq!(list.clear(), 2);
        assert!(list.is_empty());
        assert_eq!(list.clear(), 0);
    }
}
