//! InMemoryStore - テスト・デモ用の DocumentStore
//!
//! # 学習ポイント
//! - 文書ごとの障害注入（`fail_saves_of`）で「保存失敗 → メモリ未適用」を検証できる
//! - 同じインスタンスを複数の ListCell で共有すれば、別プロセスの書き込みを再現できる

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::{ArchiveEntry, CatalogEntry, ScheduleEntry};
use crate::ports::{DocumentStore, StoreError, TimezoneMap};

#[derive(Debug, Default)]
struct Documents {
    catalog: Vec<CatalogEntry>,
    schedule: Vec<ScheduleEntry>,
    archive: Vec<ArchiveEntry>,
    timezones: TimezoneMap,
    failing: BTreeSet<&'static str>,
    saves: usize,
}

/// InMemoryStore はプロセス内だけの DocumentStore
#[derive(Debug, Default)]
pub struct InMemoryStore {
    docs: Mutex<Documents>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn docs(&self) -> MutexGuard<'_, Documents> {
        self.docs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 以後 `document` の保存を失敗させる（"catalog" / "schedule" / "archive" / "timezones"）
    pub fn fail_saves_of(&self, document: &'static str) {
        self.docs().failing.insert(document);
    }

    /// 障害注入を解除
    pub fn heal(&self) {
        self.docs().failing.clear();
    }

    /// 成功した保存の回数
    pub fn save_count(&self) -> usize {
        self.docs().saves
    }

    fn check(docs: &Documents, document: &'static str) -> Result<(), StoreError> {
        if docs.failing.contains(document) {
            return Err(StoreError::Unavailable(format!("{document} writes are failing")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn load_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self.docs().catalog.clone())
    }

    async fn save_catalog(&self, entries: &[CatalogEntry]) -> Result<(), StoreError> {
        let mut docs = self.docs();
        Self::check(&docs, "catalog")?;
        docs.catalog = entries.to_vec();
        docs.saves += 1;
        Ok(())
    }

    async fn load_schedule(&self) -> Result<Vec<ScheduleEntry>, StoreError> {
        Ok(self.docs().schedule.clone())
    }

    async fn save_schedule(&self, entries: &[ScheduleEntry]) -> Result<(), StoreError> {
        let mut docs = self.docs();
        Self::check(&docs, "schedule")?;
        docs.schedule = entries.to_vec();
        docs.saves += 1;
        Ok(())
    }

    async fn load_archive(&self) -> Result<Vec<ArchiveEntry>, StoreError> {
        Ok(self.docs().archive.clone())
    }

    async fn save_archive(&self, entries: &[ArchiveEntry]) -> Result<(), StoreError> {
        let mut docs = self.docs();
        Self::check(&docs, "archive")?;
        docs.archive = entries.to_vec();
        docs.saves += 1;
        Ok(())
    }

    async fn load_timezones(&self) -> Result<TimezoneMap, StoreError> {
        Ok(self.docs().timezones.clone())
    }

    async fn save_timezones(&self, timezones: &TimezoneMap) -> Result<(), StoreError> {
        let mut docs = self.docs();
        Self::check(&docs, "timezones")?;
        docs.timezones = timezones.clone();
        docs.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActorId, Item};

    #[tokio::test]
    async fn failing_document_rejects_saves_until_healed() {
        let store = InMemoryStore::new();
        let entry = ArchiveEntry::new(Item::new("Heat", "1995", "170 min", ActorId::new("a")));

        store.fail_saves_of("archive");
        assert!(store.save_archive(&[entry.clone()]).await.is_err());
        assert!(store.load_archive().await.unwrap().is_empty());
        assert!(store.save_catalog(&[]).await.is_ok());

        store.heal();
        store.save_archive(&[entry.clone()]).await.unwrap();
        assert_eq!(store.load_archive().await.unwrap(), vec![entry]);
        assert_eq!(store.save_count(), 2);
    }
}
