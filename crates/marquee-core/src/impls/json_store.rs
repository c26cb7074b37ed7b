//! JsonFileStore - ディレクトリ上の JSON 文書による DocumentStore
//!
//! 1 文書 = 1 ファイル。書き込みは同じディレクトリの一時ファイルに書いてから
//! rename するため、途中で落ちても古い文書か新しい文書のどちらかが残る。
//! ファイルが存在しなければ空のコレクションとして扱う。

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::domain::{ArchiveEntry, CatalogEntry, ScheduleEntry};
use crate::ports::{DocumentStore, StoreError, TimezoneMap};

pub const CATALOG_FILE: &str = "recommendations.json";
pub const SCHEDULE_FILE: &str = "queue.json";
pub const ARCHIVE_FILE: &str = "watchlist.json";
pub const TIMEZONES_FILE: &str = "timezones.json";

/// JsonFileStore は `data_dir` 以下の 4 ファイルを読み書きする
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn load<T>(&self, document: &'static str, file: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default + Send + 'static,
    {
        let path = self.data_dir.join(file);
        blocking(document, move || read_document(document, &path)).await
    }

    async fn save<T>(&self, document: &'static str, file: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|source| StoreError::Malformed { document, source })?;
        let path = self.data_dir.join(file);
        blocking(document, move || {
            atomic_write(&path, &bytes).map_err(|source| StoreError::Io { document, source })
        })
        .await?;
        tracing::debug!(document, "document saved");
        Ok(())
    }
}

/// ファイル I/O は spawn_blocking で実行
async fn blocking<T, F>(document: &'static str, f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Unavailable(format!("{document} io task failed: {e}")))?
}

fn read_document<T: DeserializeOwned + Default>(
    document: &'static str,
    path: &Path,
) -> Result<T, StoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => return Err(StoreError::Io { document, source }),
    };
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed { document, source })
}

fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        self.load("catalog", CATALOG_FILE).await
    }

    async fn save_catalog(&self, entries: &[CatalogEntry]) -> Result<(), StoreError> {
        self.save("catalog", CATALOG_FILE, entries).await
    }

    async fn load_schedule(&self) -> Result<Vec<ScheduleEntry>, StoreError> {
        self.load("schedule", SCHEDULE_FILE).await
    }

    async fn save_schedule(&self, entries: &[ScheduleEntry]) -> Result<(), StoreError> {
        self.save("schedule", SCHEDULE_FILE, entries).await
    }

    async fn load_archive(&self) -> Result<Vec<ArchiveEntry>, StoreError> {
        self.load("archive", ARCHIVE_FILE).await
    }

    async fn save_archive(&self, entries: &[ArchiveEntry]) -> Result<(), StoreError> {
        self.save("archive", ARCHIVE_FILE, entries).await
    }

    async fn load_timezones(&self) -> Result<TimezoneMap, StoreError> {
        self.load("timezones", TIMEZONES_FILE).await
    }

    async fn save_timezones(&self, timezones: &TimezoneMap) -> Result<(), StoreError> {
        self.save("timezones", TIMEZONES_FILE, timezones).await
    }
}
