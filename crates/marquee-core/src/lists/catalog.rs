//! Catalog: the proposed, voteable list.
//!
//! Rules enforced here:
//! - at most `capacity` entries (checked only when a new entry would be inserted)
//! - one vote per actor, never by the recommender
//! - only the recommender or an admin may remove an entry
//!
//! Cross-list checks (already scheduled / already archived) belong to the
//! coordinator, which holds the other lists' locks while calling `propose`.

use async_trait::async_trait;

use super::cell::{ListCell, ListDocument};
use crate::domain::{ActorId, CatalogEntry, Item, ListKind, MarqueeError};
use crate::ports::{DocumentStore, StoreError};

/// Default catalog capacity.
pub const DEFAULT_CAPACITY: usize = 20;

/// Result of a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal {
    /// A new entry was inserted with zero votes.
    Created(CatalogEntry),
    /// The title was already proposed; the call counted as a vote.
    Voted { title: String, votes: u32 },
}

/// In-memory catalog state, in insertion order.
#[derive(Debug, Clone)]
pub struct CatalogList {
    entries: Vec<CatalogEntry>,
    capacity: usize,
}

impl CatalogList {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    pub fn with_entries(capacity: usize, entries: Vec<CatalogEntry>) -> Self {
        Self { entries, capacity }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn find(&self, title: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.item.has_title(title))
    }

    pub fn contains(&self, title: &str) -> bool {
        self.find(title).is_some()
    }

    fn position(&self, title: &str) -> Result<usize, MarqueeError> {
        self.entries
            .iter()
            .position(|e| e.item.has_title(title))
            .ok_or_else(|| MarqueeError::not_found(ListKind::Catalog, title))
    }

    /// Insert `item` proposed by `actor`, or count a vote if the title exists.
    ///
    /// A full catalog rejects every proposal, repeats included.
    pub fn propose(&mut self, item: Item, actor: &ActorId) -> Result<Proposal, MarqueeError> {
        if self.entries.len() >= self.capacity {
            return Err(MarqueeError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if self.contains(&item.title) {
            let votes = self.vote(&item.title, actor)?;
            return Ok(Proposal::Voted {
                title: item.title,
                votes,
            });
        }
        let entry = CatalogEntry::new(item);
        self.entries.push(entry.clone());
        Ok(Proposal::Created(entry))
    }

    pub fn vote(&mut self, title: &str, actor: &ActorId) -> Result<u32, MarqueeError> {
        let idx = self.position(title)?;
        self.entries[idx].cast_vote(actor)
    }

    pub fn remove(
        &mut self,
        title: &str,
        actor: &ActorId,
        is_admin: bool,
    ) -> Result<CatalogEntry, MarqueeError> {
        let idx = self.position(title)?;
        let entry = &self.entries[idx];
        if entry.item.recommended_by != *actor && !is_admin {
            return Err(MarqueeError::NotOwner(entry.item.title.clone()));
        }
        Ok(self.entries.remove(idx))
    }

    /// Detach an entry for promotion.
    pub fn pop(&mut self, title: &str) -> Result<CatalogEntry, MarqueeError> {
        let idx = self.position(title)?;
        Ok(self.entries.remove(idx))
    }

    /// Highest votes first; equal votes keep insertion order.
    pub fn top_n(&self, n: usize) -> Vec<CatalogEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.votes.cmp(&a.votes));
        sorted.truncate(n);
        sorted
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }
}

impl Default for CatalogList {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl ListDocument for CatalogList {
    const DOCUMENT: &'static str = "catalog";

    async fn reload_from(&mut self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        self.entries = store.load_catalog().await?;
        Ok(())
    }

    async fn save_to(&self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        store.save_catalog(&self.entries).await
    }
}

/// Catalog manager: the catalog list behind its own lock.
pub type Catalog = ListCell<CatalogList>;

impl ListCell<CatalogList> {
    pub async fn vote(&self, title: &str, actor: &ActorId) -> Result<u32, MarqueeError> {
        let votes = self.mutate(|list| list.vote(title, actor)).await?;
        tracing::info!(title, actor = %actor, votes, "vote counted");
        Ok(votes)
    }

    pub async fn remove(
        &self,
        title: &str,
        actor: &ActorId,
        is_admin: bool,
    ) -> Result<CatalogEntry, MarqueeError> {
        let entry = self
            .mutate(|list| list.remove(title, actor, is_admin))
            .await?;
        tracing::info!(title = %entry.title(), actor = %actor, "recommendation removed");
        Ok(entry)
    }

    pub async fn top_n(&self, n: usize) -> Result<Vec<CatalogEntry>, MarqueeError> {
        self.read(|list| list.top_n(n)).await
    }

    pub async fn clear(&self) -> Result<usize, MarqueeError> {
        let removed = self.mutate(|list| Ok(list.clear())).await?;
        tracing::info!(removed, "catalog cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn item(title: &str, by: &str) -> Item {
        Item::new(title, "2021", "120 min", ActorId::new(by))
    }

    fn actor(id: &str) -> ActorId {
        ActorId::new(id)
    }

    #[test]
    fn dune_voting_scenario() {
        let mut list = CatalogList::default();
        let proposal = list.propose(item("Dune", "a"), &actor("a")).unwrap();
        assert!(matches!(proposal, Proposal::Created(ref e) if e.votes == 0 && e.voters.is_empty()));

        assert_eq!(list.vote("Dune", &actor("b")).unwrap(), 1);
        let entry = list.find("Dune").unwrap();
        assert_eq!(entry.voters.iter().collect::<Vec<_>>(), vec![&actor("b")]);

        assert!(matches!(
            list.vote("Dune", &actor("a")),
            Err(MarqueeError::SelfVote(_))
        ));
        assert!(matches!(
            list.vote("Dune", &actor("b")),
            Err(MarqueeError::AlreadyVoted(_))
        ));
        assert_eq!(list.find("Dune").unwrap().votes, 1);
    }

    #[test]
    fn repeat_proposal_counts_as_vote() {
        let mut list = CatalogList::default();
        list.propose(item("Dune", "a"), &actor("a")).unwrap();
        let again = list.propose(item("Dune", "b"), &actor("b")).unwrap();
        assert_eq!(
            again,
            Proposal::Voted {
                title: "Dune".into(),
                votes: 1
            }
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn twenty_first_proposal_is_rejected() {
        let mut list = CatalogList::default();
        for i in 0..20 {
            list.propose(item(&format!("Movie {i}"), "a"), &actor("a"))
                .unwrap();
        }
        let err = list
            .propose(item("Movie 20", "a"), &actor("a"))
            .unwrap_err();
        assert_eq!(err, MarqueeError::CapacityExceeded { capacity: 20 });
        assert_eq!(list.len(), 20);

    }

    #[test]
    fn full_catalog_rejects_repeat_proposals_but_accepts_votes() {
        let mut list = CatalogList::default();
        for i in 0..20 {
            list.propose(item(&format!("Movie {i}"), "a"), &actor("a"))
                .unwrap();
        }
        let err = list
            .propose(item("Movie 3", "b"), &actor("b"))
            .unwrap_err();
        assert_eq!(err, MarqueeError::CapacityExceeded { capacity: 20 });
        assert_eq!(list.find("Movie 3").unwrap().votes, 0);

        assert_eq!(list.vote("Movie 3", &actor("b")).unwrap(), 1);
        assert_eq!(list.len(), 20);
    }

    #[rstest]
    #[case::owner("a", false, true)]
    #[case::admin("z", true, true)]
    #[case::stranger("z", false, false)]
    fn remove_requires_owner_or_admin(
        #[case] who: &str,
        #[case] is_admin: bool,
        #[case] allowed: bool,
    ) {
        let mut list = CatalogList::default();
        list.propose(item("Dune", "a"), &actor("a")).unwrap();
        let result = list.remove("Dune", &actor(who), is_admin);
        assert_eq!(result.is_ok(), allowed);
        assert_eq!(list.contains("Dune"), !allowed);
        if !allowed {
            assert!(matches!(result, Err(MarqueeError::NotOwner(_))));
        }
    }

    #[test]
    fn remove_twice_reports_not_found() {
        let mut list = CatalogList::default();
        list.propose(item("Dune", "a"), &actor("a")).unwrap();
        assert!(list.remove("Dune", &actor("a"), false).is_ok());
        assert!(matches!(
            list.remove("Dune", &actor("a"), false),
            Err(MarqueeError::NotFound { list: ListKind::Catalog, .. })
        ));
        assert!(list.is_empty());
    }

    #[test]
    fn top_n_sorts_by_votes_and_keeps_insertion_order_on_ties() {
        let mut list = CatalogList::default();
        for title in ["A", "B", "C", "D"] {
            list.propose(item(title, "owner"), &actor("owner")).unwrap();
        }
        list.vote("C", &actor("x")).unwrap();
        list.vote("C", &actor("y")).unwrap();
        list.vote("B", &actor("x")).unwrap();

        let titles: Vec<_> = list
            .top_n(10)
            .iter()
            .map(|e| e.title().to_string())
            .collect();
        assert_eq!(titles, vec!["C", "B", "A", "D"]);
        assert_eq!(list.top_n(2).len(), 2);
    }

    #[test]
    fn pop_detaches_entry() {
        let mut list = CatalogList::default();
        list.propose(item("Dune", "a"), &actor("a")).unwrap();
        let entry = list.pop("dune").unwrap();
        assert_eq!(entry.title(), "Dune");
        assert!(list.pop("Dune").is_err());
    }
}
