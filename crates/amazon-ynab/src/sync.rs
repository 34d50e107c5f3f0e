//! Incremental fetching of ledger transactions.

use crate::cache::{CacheStore, SyncCache};
use crate::error::{RemoteError, RunError};
use crate::ledger::{Cursor, LedgerTransaction};
use crate::remote::LedgerApi;

/// Fetches only what changed since the last cursor.
pub struct DeltaSync<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: LedgerApi + ?Sized> DeltaSync<'a, A> {
    pub fn new(api: &'a A) -> Self {
        DeltaSync { api }
    }

    /// Without a cursor this is a full fetch; with one, only the delta is requested.
    /// Failures are returned as-is: an empty result always means "nothing new".
    pub async fn fetch(
        &self,
        cursor: Option<Cursor>,
    ) -> Result<(Cursor, Vec<LedgerTransaction>), RemoteError> {
        match cursor {
            Some(cursor) => tracing::info!("Fetching transactions changed since {cursor}"),
            None => tracing::info!("No server knowledge cached, fetching all transactions"),
        }

        let page = self.api.fetch_transactions(cursor).await?;
        tracing::info!(
            "Fetched {} transactions (server knowledge {})",
            page.transactions.len(),
            page.server_knowledge
        );
        Ok((page.server_knowledge, page.transactions))
    }
}

/// Load the cache, pull the delta, merge it and persist the result.
///
/// The cache file is only written after a successful fetch, so a failed sync
/// keeps the last good cursor.
pub async fn sync_cache<A: LedgerApi + ?Sized>(
    store: &CacheStore,
    api: &A,
) -> Result<SyncCache, RunError> {
    let mut cache = store.load().map_err(RunError::Cache)?;

    let (cursor, fetched) = DeltaSync::new(api).fetch(cache.server_knowledge).await?;
    let stats = cache.merge(cursor, fetched);
    if stats.changed() {
        tracing::info!(
            "Cached {} new and {} updated transactions",
            stats.added,
            stats.replaced
        );
    }

    store.save(&cache).map_err(RunError::Cache)?;
    Ok(cache)
}
