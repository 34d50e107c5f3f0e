//! Local snapshot of ledger transactions and the cursor they were synced up to.

use crate::ledger::{Cursor, LedgerTransaction};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncCache {
    pub transactions: Vec<LedgerTransaction>,
    pub server_knowledge: Option<Cursor>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub replaced: usize,
}

impl MergeStats {
    pub fn changed(&self) -> bool {
        self.added + self.replaced > 0
    }
}

impl SyncCache {
    /// Fold a fetch result into the cache.
    ///
    /// New ids are appended in the order received. An id that is already cached
    /// is replaced in place, keeping ids unique and the original position stable.
    /// The cursor is always replaced, including when `fetched` is empty.
    pub fn merge(&mut self, cursor: Cursor, fetched: Vec<LedgerTransaction>) -> MergeStats {
        let mut positions: HashMap<String, usize> = self
            .transactions
            .iter()
            .enumerate()
            .map(|(position, transaction)| (transaction.id.clone(), position))
            .collect();

        let mut stats = MergeStats::default();
        for transaction in fetched {
            match positions.get(&transaction.id) {
                Some(&position) => {
                    tracing::debug!("Replacing cached transaction {}", transaction.id);
                    self.transactions[position] = transaction;
                    stats.replaced += 1;
                }
                None => {
                    positions.insert(transaction.id.clone(), self.transactions.len());
                    self.transactions.push(transaction);
                    stats.added += 1;
                }
            }
        }

        self.server_knowledge = Some(cursor);
        stats
    }
}

/// Owns the cache file. Nothing else reads or writes it.
///
/// Only one run may use a given cache file at a time; there is no locking.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CacheStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache. A missing file is an empty cache, not an error.
    pub fn load(&self) -> Result<SyncCache> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No cache at {}, starting fresh", self.path.display());
                return Ok(SyncCache::default());
            }
            Err(error) => {
                return Err(anyhow::Error::new(error)
                    .context(format!("Failed to read cache file: {}", self.path.display())));
            }
        };

        let cache: SyncCache = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", self.path.display()))?;
        tracing::debug!(
            "Loaded {} cached transactions (server knowledge {:?})",
            cache.transactions.len(),
            cache.server_knowledge
        );
        Ok(cache)
    }

    /// Replace the cache file. Writes a sibling temp file and renames it over the
    /// target, so a failed write leaves the previous cache untouched.
    pub fn save(&self, cache: &SyncCache) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.temp_path();
        let result = write_synced(&temp_path, cache).and_then(|()| {
            std::fs::rename(&temp_path, &self.path).with_context(|| {
                format!("Failed to replace cache file: {}", self.path.display())
            })
        });
        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        result?;

        tracing::debug!(
            "Saved {} transactions to {}",
            cache.transactions.len(),
            self.path.display()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| "cache.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, cache: &SyncCache) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer(&mut file, cache)
        .with_context(|| format!("Failed to serialize cache to {}", path.display()))?;
    file.flush()?;
    file.sync_all()
        .with_context(|| format!("Failed to sync {}", path.display()))?;
    Ok(())
}
