//! ListCell - 1 つのリストとそのロック
//!
//! 各リストは専用の `tokio::sync::Mutex` の下にあり、変更は必ず
//! 「複製 → 変更 → 保存 → 適用」の順で行う。保存に失敗した変更は
//! メモリにも残らない（write-behind なし）。
//!
//! 複数リストにまたがる遷移は `lock()` で得た `ListGuard` を
//! Catalog → Schedule → Archive の順に取得し、`commit_pair` で確定する。

use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::MarqueeError;
use crate::ports::{DocumentStore, StoreError};

/// ListDocument はストア上の 1 文書に対応するリスト状態
#[async_trait]
pub trait ListDocument: Clone + Send + Sync + 'static {
    /// ログ用の文書名
    const DOCUMENT: &'static str;

    /// ストアの内容で置き換える
    async fn reload_from(&mut self, store: &dyn DocumentStore) -> Result<(), StoreError>;

    /// 文書全体を保存する
    async fn save_to(&self, store: &dyn DocumentStore) -> Result<(), StoreError>;
}

/// ListCell はリスト状態を所有し、ロック経由でのみ公開する
pub struct ListCell<L> {
    state: Mutex<L>,
    store: Arc<dyn DocumentStore>,
    refresh_on_lock: bool,
}

impl<L: ListDocument> ListCell<L> {
    /// ストアから読み込んで開く
    ///
    /// `refresh_on_lock` が true のとき、ロック取得のたびにストアから読み直す
    /// （同じストアを複数プロセスで共有する構成向け）。
    pub async fn open(
        mut initial: L,
        store: Arc<dyn DocumentStore>,
        refresh_on_lock: bool,
    ) -> Result<Self, MarqueeError> {
        initial.reload_from(store.as_ref()).await?;
        Ok(Self {
            state: Mutex::new(initial),
            store,
            refresh_on_lock,
        })
    }

    /// ロックを取得
    pub async fn lock(&self) -> Result<ListGuard<'_, L>, MarqueeError> {
        let mut guard = self.state.lock().await;
        if self.refresh_on_lock {
            let mut fresh = guard.clone();
            fresh.reload_from(self.store.as_ref()).await?;
            *guard = fresh;
        }
        Ok(ListGuard {
            guard,
            store: self.store.as_ref(),
        })
    }

    /// ストアから読み直す（失敗時はメモリ上の状態を保持）
    pub async fn reload(&self) -> Result<(), MarqueeError> {
        let mut guard = self.state.lock().await;
        let mut fresh = guard.clone();
        fresh.reload_from(self.store.as_ref()).await?;
        *guard = fresh;
        tracing::debug!(document = L::DOCUMENT, "reloaded from store");
        Ok(())
    }

    /// ロック下で読み取る
    pub async fn read<R>(&self, f: impl FnOnce(&L) -> R) -> Result<R, MarqueeError> {
        let guard = self.lock().await?;
        Ok(f(&*guard))
    }

    /// ロック下で変更し、保存に成功したら適用する
    pub async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut L) -> Result<R, MarqueeError>,
    ) -> Result<R, MarqueeError> {
        let mut guard = self.lock().await?;
        let mut draft = guard.draft();
        let out = f(&mut draft)?;
        guard.commit(draft).await?;
        Ok(out)
    }
}

/// ListGuard はロック中のリスト
pub struct ListGuard<'a, L> {
    guard: MutexGuard<'a, L>,
    store: &'a dyn DocumentStore,
}

impl<L: ListDocument> ListGuard<'_, L> {
    /// 変更用の複製
    pub fn draft(&self) -> L {
        self.guard.clone()
    }

    /// `next` を保存してから適用する
    pub async fn commit(&mut self, next: L) -> Result<(), MarqueeError> {
        next.save_to(self.store).await?;
        *self.guard = next;
        Ok(())
    }

    /// 現在の状態をストアへ書き戻す（ロールバック用）
    async fn restore(&self) -> Result<(), StoreError> {
        self.guard.save_to(self.store).await
    }
}

impl<L> Deref for ListGuard<'_, L> {
    type Target = L;

    fn deref(&self) -> &L {
        &self.guard
    }
}

/// 2 つのリストの変更をまとめて確定する
///
/// 移動先（`dest`）を先に保存し、移動元（`source`）の保存に失敗したら
/// 移動先を元に戻す。どちらもメモリへの適用は両方の保存が成功した後。
pub async fn commit_pair<S, D>(
    source: &mut ListGuard<'_, S>,
    source_next: S,
    dest: &mut ListGuard<'_, D>,
    dest_next: D,
) -> Result<(), MarqueeError>
where
    S: ListDocument,
    D: ListDocument,
{
    dest_next.save_to(dest.store).await?;
    if let Err(err) = source_next.save_to(source.store).await {
        if let Err(rollback) = dest.restore().await {
            tracing::error!(
                document = D::DOCUMENT,
                error = %rollback,
                "rollback failed; store may hold the item in two lists"
            );
        }
        return Err(err.into());
    }
    *dest.guard = dest_next;
    *source.guard = source_next;
    Ok(())
}
