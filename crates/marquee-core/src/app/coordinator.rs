//! LifecycleCoordinator - リストをまたぐ遷移
//!
//! 合法な遷移はここにしかない：
//! - Catalog → Schedule（`promote_to_schedule`）
//! - Schedule → Archive（`archive_scheduled` / `sweep`）
//! - Catalog / 検索結果 → Archive（`mark_watched`、確認つき）
//!
//! # ロック順序
//! 複数リストを取るときは必ず Catalog → Schedule → Archive の順。
//! 確認待ちの間はどのロックも持たず、戻ってから前提条件を再検証する。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{
    ActorId, ArchiveEntry, Card, ListKind, MarqueeError, ScheduleEntry,
};
use crate::lists::{Archive, Catalog, Proposal, Schedule, TimezoneBook, commit_pair};
use crate::ports::{Clock, Confirmation, Confirmer, DisplayChannel, LookupRecord, MovieLookup};
use crate::render::{self, ListView};

/// 告知 1 件あたりの上限
const ANNOUNCE_TIMEOUT: Duration = Duration::from_secs(10);

/// 推薦の結果（検索レコードつき）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposed {
    pub proposal: Proposal,
    pub record: LookupRecord,
}

/// 視聴済みにした項目の移動元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedFrom {
    Schedule,
    Catalog,
    /// どのリストにもなく、検索結果をそのまま追加した
    Lookup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watched {
    pub entry: ArchiveEntry,
    pub from: WatchedFrom,
}

/// LifecycleCoordinator は 3 つのリストと外部協調者を束ねる
///
/// リスト状態そのものは各 manager が持ち、ここでは保持しない。
pub struct LifecycleCoordinator {
    catalog: Catalog,
    schedule: Schedule,
    archive: Archive,
    timezones: TimezoneBook,
    lookup: Arc<dyn MovieLookup>,
    confirmer: Arc<dyn Confirmer>,
    channel: Arc<dyn DisplayChannel>,
    clock: Arc<dyn Clock>,
    confirm_timeout: Duration,
}

impl LifecycleCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        catalog: Catalog,
        schedule: Schedule,
        archive: Archive,
        timezones: TimezoneBook,
        lookup: Arc<dyn MovieLookup>,
        confirmer: Arc<dyn Confirmer>,
        channel: Arc<dyn DisplayChannel>,
        clock: Arc<dyn Clock>,
        confirm_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            schedule,
            archive,
            timezones,
            lookup,
            confirmer,
            channel,
            clock,
            confirm_timeout,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub fn timezones(&self) -> &TimezoneBook {
        &self.timezones
    }

    pub fn channel(&self) -> &Arc<dyn DisplayChannel> {
        &self.channel
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// 自由入力タイトルを正規レコードに解決（ロックは取らない）
    pub async fn resolve(&self, query: &str) -> Result<LookupRecord, MarqueeError> {
        self.lookup.lookup(query).await.map_err(|err| {
            tracing::info!(query, error = %err, "lookup failed");
            MarqueeError::LookupFailed(query.to_string())
        })
    }

    /// 推薦する（既に推薦済みなら投票として扱う）
    ///
    /// Schedule / Archive に同じ正規タイトルがあれば挿入せずに拒否する。
    pub async fn propose(&self, actor: &ActorId, query: &str) -> Result<Proposed, MarqueeError> {
        let record = self.resolve(query).await?;
        let title = record.title.as_str();

        let mut catalog = self.catalog.lock().await?;
        let schedule = self.schedule.lock().await?;
        let archive = self.archive.lock().await?;

        if catalog.len() >= catalog.capacity() {
            return Err(MarqueeError::CapacityExceeded {
                capacity: catalog.capacity(),
            });
        }
        if let Some(scheduled) = schedule.find(title) {
            return Err(MarqueeError::AlreadyScheduled {
                title: scheduled.title().to_string(),
                scheduled_at: scheduled.scheduled_at,
            });
        }
        if archive.contains(title) {
            return Err(MarqueeError::AlreadyArchived(title.to_string()));
        }

        let mut next = catalog.draft();
        let proposal = next.propose(record.to_item(actor), actor)?;
        catalog.commit(next).await?;

        match &proposal {
            Proposal::Created(entry) => {
                tracing::info!(title = %entry.title(), actor = %actor, "recommendation created")
            }
            Proposal::Voted { title, votes } => {
                tracing::info!(title = %title, actor = %actor, votes, "repeat recommendation counted as vote")
            }
        }
        Ok(Proposed { proposal, record })
    }

    /// Catalog → Schedule（投票情報は破棄、時刻なし）
    pub async fn promote_to_schedule(&self, title: &str) -> Result<ScheduleEntry, MarqueeError> {
        let mut catalog = self.catalog.lock().await?;
        let mut schedule = self.schedule.lock().await?;

        let mut catalog_next = catalog.draft();
        let entry = catalog_next.pop(title)?;
        let mut schedule_next = schedule.draft();
        let admitted = schedule_next.admit(entry.into_item())?;

        commit_pair(&mut catalog, catalog_next, &mut schedule, schedule_next).await?;
        tracing::info!(title = %admitted.title(), "promoted to schedule");
        Ok(admitted)
    }

    /// Schedule → Archive（手動）
    pub async fn archive_scheduled(&self, title: &str) -> Result<ArchiveEntry, MarqueeError> {
        let mut schedule = self.schedule.lock().await?;
        let mut archive = self.archive.lock().await?;

        let mut schedule_next = schedule.draft();
        let entry = schedule_next.pop(title)?;
        let mut archive_next = archive.draft();
        let archived = archive_next.append(entry.into_item());

        commit_pair(&mut schedule, schedule_next, &mut archive, archive_next).await?;
        tracing::info!(title = %archived.title(), "moved from schedule to archive");
        Ok(archived)
    }

    /// Schedule → Archive（時刻到来）
    ///
    /// `now` と同じ分に予定された項目を Archive へ移し、ロックを放してから告知する。
    /// 告知の失敗・時間切れはログのみ。移動は告知の前に確定しているので、
    /// 同じ分に 2 回呼ばれても 2 回目は何もしない。
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<Vec<ArchiveEntry>, MarqueeError> {
        let swept = {
            let mut schedule = self.schedule.lock().await?;
            let mut archive = self.archive.lock().await?;

            let due = schedule.due_at(now);
            if due.is_empty() {
                return Ok(Vec::new());
            }

            let mut schedule_next = schedule.draft();
            let mut archive_next = archive.draft();
            let mut moved = Vec::with_capacity(due.len());
            for entry in &due {
                let popped = schedule_next.pop(entry.title())?;
                archive_next.append(popped.clone().into_item());
                moved.push(popped);
            }

            commit_pair(&mut schedule, schedule_next, &mut archive, archive_next).await?;
            moved
        };

        for entry in &swept {
            tracing::info!(title = %entry.title(), at = %now, "swept to archive");
            self.announce_now_playing(entry).await;
        }
        Ok(swept
            .into_iter()
            .map(|entry| ArchiveEntry::new(entry.into_item()))
            .collect())
    }

    async fn announce_now_playing(&self, entry: &ScheduleEntry) {
        let card = render::now_playing_card(entry);
        match tokio::time::timeout(ANNOUNCE_TIMEOUT, self.channel.post(&card)).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                tracing::warn!(title = %entry.title(), error = %err, "announcement failed")
            }
            Err(_) => tracing::warn!(title = %entry.title(), "announcement timed out"),
        }
    }

    /// 視聴済みにする
    ///
    /// 予定済みなら確認なしで Schedule → Archive。それ以外は確認を取り、
    /// ロックを取り直してから、確認した操作の前提がまだ成り立つ場合だけ実行する。
    /// 確認待ちの間に予定へ昇格していれば Schedule → Archive として扱う。
    pub async fn mark_watched(&self, actor: &ActorId, query: &str) -> Result<Watched, MarqueeError> {
        let record = self.resolve(query).await?;
        let title = record.title.clone();

        if self.archive.read(|a| a.contains(&title)).await? {
            return Err(MarqueeError::AlreadyArchived(title));
        }
        if self.schedule.read(|s| s.contains(&title)).await? {
            let entry = self.archive_scheduled(&title).await?;
            return Ok(Watched {
                entry,
                from: WatchedFrom::Schedule,
            });
        }

        let offered = if self.catalog.read(|c| c.contains(&title)).await? {
            WatchedFrom::Catalog
        } else {
            WatchedFrom::Lookup
        };
        let prompt = match offered {
            WatchedFrom::Catalog => {
                format!("Move `{title}` from the recommendations to the watchlist?")
            }
            _ => format!("`{title}` is not in the recommendations. Add it to the watchlist anyway?"),
        };
        let answer = tokio::time::timeout(self.confirm_timeout, self.confirmer.confirm(actor, &prompt))
            .await
            .unwrap_or(Confirmation::TimedOut);
        if !answer.is_confirmed() {
            tracing::info!(title = %title, actor = %actor, ?answer, "watch cancelled");
            return Err(MarqueeError::Cancelled(title));
        }

        let mut catalog = self.catalog.lock().await?;
        let mut schedule = self.schedule.lock().await?;
        let mut archive = self.archive.lock().await?;

        if archive.contains(&title) {
            return Err(MarqueeError::AlreadyArchived(title));
        }

        let mut archive_next = archive.draft();
        let watched = if schedule.contains(&title) {
            let mut schedule_next = schedule.draft();
            let entry = schedule_next.pop(&title)?;
            let archived = archive_next.append(entry.into_item());
            commit_pair(&mut schedule, schedule_next, &mut archive, archive_next).await?;
            Watched {
                entry: archived,
                from: WatchedFrom::Schedule,
            }
        } else {
            match (offered, catalog.contains(&title)) {
                (WatchedFrom::Catalog, true) => {
                    let mut catalog_next = catalog.draft();
                    let entry = catalog_next.pop(&title)?;
                    let archived = archive_next.append(entry.into_item());
                    commit_pair(&mut catalog, catalog_next, &mut archive, archive_next).await?;
                    Watched {
                        entry: archived,
                        from: WatchedFrom::Catalog,
                    }
                }
                (WatchedFrom::Catalog, false) => {
                    tracing::info!(title = %title, actor = %actor, "withdrawn while awaiting confirmation");
                    return Err(MarqueeError::not_found(ListKind::Catalog, title));
                }
                (_, true) => {
                    tracing::info!(title = %title, actor = %actor, "recommended while awaiting confirmation");
                    return Err(MarqueeError::Cancelled(title));
                }
                (_, false) => {
                    let archived = archive_next.append(record.to_item(actor));
                    archive.commit(archive_next).await?;
                    Watched {
                        entry: archived,
                        from: WatchedFrom::Lookup,
                    }
                }
            }
        };

        tracing::info!(title = %watched.entry.title(), from = ?watched.from, actor = %actor, "marked watched");
        Ok(watched)
    }

    /// actor のタイムゾーンで予定時刻を設定
    pub async fn assign_time(
        &self,
        actor: &ActorId,
        title: &str,
        local_time_text: &str,
    ) -> Result<i64, MarqueeError> {
        let zone = self.timezones.zone_of(actor).await?;
        self.schedule.assign_time(title, local_time_text, &zone).await
    }

    /// 次に予定されている項目
    pub async fn next_up(&self) -> Result<Option<ScheduleEntry>, MarqueeError> {
        self.schedule.next_scheduled().await
    }

    /// 予定済み項目の告知カード（状態は変えない）
    pub async fn announce(&self, title: &str) -> Result<Card, MarqueeError> {
        self.schedule
            .find(title)
            .await?
            .map(|entry| render::now_playing_card(&entry))
            .ok_or_else(|| MarqueeError::not_found(ListKind::Schedule, title))
    }

    /// `kind` のリストをストアから読み直す
    pub async fn reload(&self, kind: ListKind) -> Result<(), MarqueeError> {
        match kind {
            ListKind::Catalog => self.catalog.reload().await,
            ListKind::Schedule => self.schedule.reload().await,
            ListKind::Archive => self.archive.reload().await,
        }
    }

    /// 表示用のスナップショット（リストのロック下で取得）
    pub async fn view(&self, kind: ListKind, archive_recent: usize) -> Result<ListView, MarqueeError> {
        Ok(match kind {
            ListKind::Catalog => ListView::Catalog(self.catalog.read(|c| c.top_n(c.len())).await?),
            ListKind::Schedule => ListView::Schedule(self.schedule.ordered().await?),
            ListKind::Archive => ListView::Archive(self.archive.recent_n(archive_recent).await?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::MarqueeBuilder;
    use crate::impls::{InMemoryChannel, InMemoryStore, ScriptedConfirmer, StaticLookup};
    use crate::domain::MessageId;
    use crate::ports::{ChannelError, DocumentStore, FixedClock, PostedMessage};
    use chrono::TimeZone;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct Harness {
        coordinator: LifecycleCoordinator,
        store: Arc<InMemoryStore>,
        channel: Arc<InMemoryChannel>,
    }

    fn lookup() -> StaticLookup {
        ["Dune", "Arrival", "Heat", "Alien"]
            .into_iter()
            .fold(StaticLookup::new(), |lookup, title| {
                lookup.with(LookupRecord::new(title, "2000", "120 min"))
            })
            .alias("dune part one", "Dune")
    }

    async fn harness(confirmer: ScriptedConfirmer) -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let channel = Arc::new(InMemoryChannel::new());
        let coordinator = MarqueeBuilder::new()
            .store(store.clone())
            .lookup(Arc::new(lookup()))
            .confirmer(Arc::new(confirmer))
            .channel(channel.clone())
            .clock(Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())))
            .confirm_timeout(Duration::from_millis(50))
            .build_coordinator()
            .await
            .unwrap();
        Harness {
            coordinator,
            store,
            channel,
        }
    }

    fn actor(id: &str) -> ActorId {
        ActorId::new(id)
    }

    #[tokio::test]
    async fn propose_keys_by_canonical_title() {
        let h = harness(ScriptedConfirmer::always(Confirmation::Declined)).await;
        let first = h.coordinator.propose(&actor("a"), "dune part one").await.unwrap();
        assert!(matches!(first.proposal, Proposal::Created(ref e) if e.title() == "Dune"));

        let again = h.coordinator.propose(&actor("b"), "DUNE").await.unwrap();
        assert_eq!(
            again.proposal,
            Proposal::Voted {
                title: "Dune".into(),
                votes: 1
            }
        );
    }

    #[tokio::test]
    async fn propose_rejects_scheduled_and_archived_titles() {
        let h = harness(ScriptedConfirmer::always(Confirmation::Declined)).await;
        let c = &h.coordinator;
        c.propose(&actor("a"), "Dune").await.unwrap();
        c.promote_to_schedule("Dune").await.unwrap();
        assert!(matches!(
            c.propose(&actor("b"), "Dune").await,
            Err(MarqueeError::AlreadyScheduled { ref title, scheduled_at: None }) if title == "Dune"
        ));

        c.archive_scheduled("Dune").await.unwrap();
        assert_eq!(
            c.propose(&actor("b"), "dune").await.unwrap_err(),
            MarqueeError::AlreadyArchived("Dune".into())
        );
        assert!(c.catalog().read(|l| l.is_empty()).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_title_is_lookup_failure() {
        let h = harness(ScriptedConfirmer::always(Confirmation::Declined)).await;
        assert_eq!(
            h.coordinator.propose(&actor("a"), "Zardoz").await.unwrap_err(),
            MarqueeError::LookupFailed("Zardoz".into())
        );
        assert_eq!(h.store.save_count(), 0);
    }

    #[tokio::test]
    async fn promotion_discards_votes_and_clears_time() {
        let h = harness(ScriptedConfirmer::always(Confirmation::Declined)).await;
        let c = &h.coordinator;
        c.propose(&actor("a"), "Heat").await.unwrap();
        c.catalog().vote("Heat", &actor("b")).await.unwrap();

        let entry = c.promote_to_schedule("heat").await.unwrap();
        assert_eq!(entry.title(), "Heat");
        assert_eq!(entry.scheduled_at, None);
        assert!(c.catalog().read(|l| l.is_empty()).await.unwrap());
        assert_eq!(
            c.promote_to_schedule("Heat").await.unwrap_err(),
            MarqueeError::not_found(ListKind::Catalog, "Heat")
        );
    }

    #[tokio::test]
    async fn failed_source_save_rolls_back_destination() {
        let h = harness(ScriptedConfirmer::always(Confirmation::Declined)).await;
        let c = &h.coordinator;
        c.propose(&actor("a"), "Heat").await.unwrap();

        h.store.fail_saves_of("catalog");
        let err = c.promote_to_schedule("Heat").await.unwrap_err();
        assert!(matches!(err, MarqueeError::StoreUnavailable(_)));

        assert!(c.catalog().read(|l| l.contains("Heat")).await.unwrap());
        assert!(c.schedule().read(|l| l.is_empty()).await.unwrap());
        assert!(h.store.load_schedule().await.unwrap().is_empty());
        assert_eq!(h.store.load_catalog().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sweep_archives_once_then_announces() {
        let h = harness(ScriptedConfirmer::always(Confirmation::Declined)).await;
        let c = &h.coordinator;
        c.propose(&actor("a"), "Alien").await.unwrap();
        c.promote_to_schedule("Alien").await.unwrap();
        let at = c.assign_time(&actor("a"), "Alien", "01-01-2030 20:00").await.unwrap();

        let now = DateTime::from_timestamp(at + 30, 0).unwrap();
        let first = c.sweep(now).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(c.sweep(now).await.unwrap().is_empty());

        assert_eq!(c.archive().titles().await.unwrap().len(), 1);
        let cards = h.channel.own_cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Now Playing");
    }

    #[tokio::test]
    async fn sweep_archives_even_when_announcement_fails() {
        let h = harness(ScriptedConfirmer::always(Confirmation::Declined)).await;
        let c = &h.coordinator;
        c.propose(&actor("a"), "Alien").await.unwrap();
        c.promote_to_schedule("Alien").await.unwrap();
        let at = c.assign_time(&actor("a"), "Alien", "01-01-2030 20:00").await.unwrap();

        h.channel.set_available(false);
        let archived = c.sweep(DateTime::from_timestamp(at, 0).unwrap()).await.unwrap();
        assert_eq!(archived.len(), 1);
        assert!(c.schedule().read(|l| l.is_empty()).await.unwrap());
    }

    #[tokio::test]
    async fn watched_scheduled_title_skips_confirmation() {
        let confirmer = ScriptedConfirmer::always(Confirmation::Declined);
        let h = harness(confirmer).await;
        let c = &h.coordinator;
        c.propose(&actor("a"), "Heat").await.unwrap();
        c.promote_to_schedule("Heat").await.unwrap();

        let watched = c.mark_watched(&actor("z"), "heat").await.unwrap();
        assert_eq!(watched.from, WatchedFrom::Schedule);
        assert_eq!(watched.entry.item.recommended_by, actor("a"));
    }

    #[tokio::test]
    async fn watched_catalog_title_requires_confirmation() {
        let h = harness(ScriptedConfirmer::new([Confirmation::Declined, Confirmation::Confirmed])).await;
        let c = &h.coordinator;
        c.propose(&actor("a"), "Heat").await.unwrap();

        assert_eq!(
            c.mark_watched(&actor("z"), "Heat").await.unwrap_err(),
            MarqueeError::Cancelled("Heat".into())
        );
        assert!(c.catalog().read(|l| l.contains("Heat")).await.unwrap());

        let watched = c.mark_watched(&actor("z"), "Heat").await.unwrap();
        assert_eq!(watched.from, WatchedFrom::Catalog);
        assert!(c.catalog().read(|l| l.is_empty()).await.unwrap());
        assert_eq!(
            c.mark_watched(&actor("z"), "Heat").await.unwrap_err(),
            MarqueeError::AlreadyArchived("Heat".into())
        );
    }

    #[tokio::test]
    async fn watched_unknown_to_lists_uses_actor_as_recommender() {
        let h = harness(ScriptedConfirmer::always(Confirmation::Confirmed)).await;
        let watched = h.coordinator.mark_watched(&actor("z"), "Arrival").await.unwrap();
        assert_eq!(watched.from, WatchedFrom::Lookup);
        assert_eq!(watched.entry.item.recommended_by, actor("z"));
    }

    #[tokio::test]
    async fn slow_confirmation_times_out_as_cancelled() {
        let slow = ScriptedConfirmer::always(Confirmation::Confirmed).with_delay(Duration::from_secs(5));
        let h = harness(slow).await;
        let err = h.coordinator.mark_watched(&actor("z"), "Arrival").await.unwrap_err();
        assert_eq!(err, MarqueeError::Cancelled("Arrival".into()));
        assert!(h.coordinator.archive().titles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn assign_time_uses_actor_zone() {
        let h = harness(ScriptedConfirmer::always(Confirmation::Declined)).await;
        let c = &h.coordinator;
        c.propose(&actor("a"), "Dune").await.unwrap();
        c.promote_to_schedule("Dune").await.unwrap();
        c.timezones().set_timezone(&actor("a"), "America/New_York").await.unwrap();

        let at = c.assign_time(&actor("a"), "dune", "25-12-2030 18:00").await.unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2030, 12, 25, 23, 0, 0).unwrap().timestamp());
        assert_eq!(c.next_up().await.unwrap().unwrap().scheduled_at, Some(at));
        assert_eq!(c.announce("Dune").await.unwrap().title, "Now Playing");
        assert!(c.announce("Heat").await.is_err());
    }

    /// 投稿が戻ってこない表示チャネル
    struct StalledChannel;

    #[async_trait]
    impl DisplayChannel for StalledChannel {
        async fn recent_own_messages(&self, _limit: usize) -> Result<Vec<PostedMessage>, ChannelError> {
            Ok(Vec::new())
        }

        async fn post(&self, _card: &Card) -> Result<MessageId, ChannelError> {
            std::future::pending().await
        }

        async fn edit(&self, id: MessageId, _card: &Card) -> Result<(), ChannelError> {
            Err(ChannelError::MessageGone(id))
        }
    }

    #[tokio::test]
    async fn stalled_announcement_does_not_block_commands() {
        let c = Arc::new(
            MarqueeBuilder::new()
                .store(Arc::new(InMemoryStore::new()))
                .lookup(Arc::new(lookup()))
                .confirmer(Arc::new(ScriptedConfirmer::always(Confirmation::Declined)))
                .channel(Arc::new(StalledChannel))
                .build_coordinator()
                .await
                .unwrap(),
        );
        c.propose(&actor("a"), "Alien").await.unwrap();
        c.promote_to_schedule("Alien").await.unwrap();
        let at = c.assign_time(&actor("a"), "Alien", "01-01-2030 20:00").await.unwrap();

        let sweeping = {
            let c = c.clone();
            tokio::spawn(async move { c.sweep(DateTime::from_timestamp(at, 0).unwrap()).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let proposed = tokio::time::timeout(Duration::from_secs(1), c.propose(&actor("b"), "Dune")).await;
        assert!(matches!(proposed, Ok(Ok(_))));
        assert!(c.archive().titles().await.unwrap().contains("Alien"));
        assert!(c.schedule().read(|l| l.is_empty()).await.unwrap());
        assert!(!sweeping.is_finished());
        sweeping.abort();
    }

    /// 解放されるまで答えない確認 UI（待ちの間にリストを変更するため）
    #[derive(Default)]
    struct GatedConfirmer {
        asked: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Confirmer for GatedConfirmer {
        async fn confirm(&self, _actor: &ActorId, _prompt: &str) -> Confirmation {
            self.asked.notify_one();
            self.release.notified().await;
            Confirmation::Confirmed
        }
    }

    enum Meanwhile {
        Scheduled,
        Archived,
        Withdrawn,
        Recommended,
    }

    /// `title` を視聴済みにしようとし、確認待ちの間に `meanwhile` を起こす
    async fn watch_while(
        title: &'static str,
        meanwhile: Meanwhile,
    ) -> (Result<Watched, MarqueeError>, Arc<LifecycleCoordinator>) {
        let gate = Arc::new(GatedConfirmer::default());
        let c = Arc::new(
            MarqueeBuilder::new()
                .store(Arc::new(InMemoryStore::new()))
                .lookup(Arc::new(lookup()))
                .confirmer(gate.clone())
                .channel(Arc::new(InMemoryChannel::new()))
                .confirm_timeout(Duration::from_secs(5))
                .build_coordinator()
                .await
                .unwrap(),
        );
        if !matches!(meanwhile, Meanwhile::Recommended) {
            c.propose(&actor("a"), title).await.unwrap();
        }

        let watching = {
            let c = c.clone();
            tokio::spawn(async move { c.mark_watched(&actor("z"), title).await })
        };
        gate.asked.notified().await;
        match meanwhile {
            Meanwhile::Scheduled => {
                c.promote_to_schedule(title).await.unwrap();
            }
            Meanwhile::Archived => {
                c.promote_to_schedule(title).await.unwrap();
                c.archive_scheduled(title).await.unwrap();
            }
            Meanwhile::Withdrawn => {
                c.catalog().remove(title, &actor("a"), false).await.unwrap();
            }
            Meanwhile::Recommended => {
                c.propose(&actor("a"), title).await.unwrap();
            }
        }
        gate.release.notify_one();
        (watching.await.unwrap(), c)
    }

    #[tokio::test]
    async fn scheduled_during_confirmation_moves_from_schedule() {
        let (result, c) = watch_while("Heat", Meanwhile::Scheduled).await;
        let watched = result.unwrap();
        assert_eq!(watched.from, WatchedFrom::Schedule);
        assert_eq!(watched.entry.item.recommended_by, actor("a"));
        assert!(c.schedule().read(|l| l.is_empty()).await.unwrap());
    }

    #[tokio::test]
    async fn archived_during_confirmation_is_rejected() {
        let (result, c) = watch_while("Heat", Meanwhile::Archived).await;
        assert_eq!(result.unwrap_err(), MarqueeError::AlreadyArchived("Heat".into()));
        assert_eq!(c.archive().titles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn withdrawn_during_confirmation_is_not_archived() {
        let (result, c) = watch_while("Heat", Meanwhile::Withdrawn).await;
        assert_eq!(
            result.unwrap_err(),
            MarqueeError::not_found(ListKind::Catalog, "Heat")
        );
        assert!(c.archive().titles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recommended_during_confirmation_keeps_recommendation() {
        let (result, c) = watch_while("Arrival", Meanwhile::Recommended).await;
        assert_eq!(result.unwrap_err(), MarqueeError::Cancelled("Arrival".into()));
        assert!(c.catalog().read(|l| l.contains("Arrival")).await.unwrap());
        assert!(c.archive().titles().await.unwrap().is_empty());
    }
}
