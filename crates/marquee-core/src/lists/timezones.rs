//! Per-actor timezone preferences.

use async_trait::async_trait;

use super::cell::{ListCell, ListDocument};
use super::schedule::parse_timezone;
use crate::domain::{ActorId, MarqueeError};
use crate::ports::{DocumentStore, StoreError, TimezoneMap};

#[derive(Debug, Clone, Default)]
pub struct TimezoneTable {
    zones: TimezoneMap,
}

impl TimezoneTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, actor: &ActorId) -> Option<&str> {
        self.zones.get(actor).map(String::as_str)
    }

    /// Validate and store `timezone` for `actor`, overwriting any previous value.
    pub fn set(&mut self, actor: ActorId, timezone: &str) -> Result<String, MarqueeError> {
        let tz = parse_timezone(timezone)?;
        let name = tz.name().to_string();
        self.zones.insert(actor, name.clone());
        Ok(name)
    }
}

#[async_trait]
impl ListDocument for TimezoneTable {
    const DOCUMENT: &'static str = "timezones";

    async fn reload_from(&mut self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        self.zones = store.load_timezones().await?;
        Ok(())
    }

    async fn save_to(&self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        store.save_timezones(&self.zones).await
    }
}

/// TimezoneBook resolves an actor's zone, falling back to a default.
pub struct TimezoneBook {
    table: ListCell<TimezoneTable>,
    default_zone: String,
}

impl TimezoneBook {
    pub fn new(table: ListCell<TimezoneTable>, default_zone: impl Into<String>) -> Self {
        Self {
            table,
            default_zone: default_zone.into(),
        }
    }

    pub fn default_zone(&self) -> &str {
        &self.default_zone
    }

    pub async fn set_timezone(
        &self,
        actor: &ActorId,
        timezone: &str,
    ) -> Result<String, MarqueeError> {
        let name = self
            .table
            .mutate(|table| table.set(actor.clone(), timezone))
            .await?;
        tracing::info!(actor = %actor, timezone = %name, "timezone set");
        Ok(name)
    }

    pub async fn zone_of(&self, actor: &ActorId) -> Result<String, MarqueeError> {
        self.table
            .read(|table| {
                table
                    .get(actor)
                    .map_or_else(|| self.default_zone.clone(), str::to_string)
            })
            .await
    }
}
