//! One reconciliation run: purchases → sync → match → update.

use crate::apply::{AppliedUpdate, UpdateApplier, UpdateOutcome};
use crate::cache::CacheStore;
use crate::error::RunError;
use crate::purchase;
use crate::reconcile::{MatchConfig, Matcher};
use crate::remote::LedgerApi;
use crate::sync::sync_cache;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub purchases_path: PathBuf,
    pub cache_path: PathBuf,
    pub dry_run: bool,
    pub matching: MatchConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub purchases: usize,
    pub transactions: usize,
    pub updates: Vec<AppliedUpdate>,
}

impl RunSummary {
    fn count(&self, predicate: impl Fn(&UpdateOutcome) -> bool) -> usize {
        self.updates
            .iter()
            .filter(|update| predicate(&update.outcome))
            .count()
    }

    pub fn applied(&self) -> usize {
        self.count(|outcome| *outcome == UpdateOutcome::Applied)
    }

    pub fn simulated(&self) -> usize {
        self.count(|outcome| *outcome == UpdateOutcome::Simulated)
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, UpdateOutcome::Failed(_)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunReport {
    /// The purchases file doesn't exist; nothing was synced or updated.
    InputMissing(PathBuf),
    Completed(RunSummary),
}

/// Report a missing purchases file before anything touches the network.
pub fn check_input(config: &RunConfig) -> Option<RunReport> {
    if config.purchases_path.exists() {
        return None;
    }
    tracing::warn!(
        "No purchases found at {}. Run the order page extractor first.",
        config.purchases_path.display()
    );
    Some(RunReport::InputMissing(config.purchases_path.clone()))
}

pub async fn run<A: LedgerApi + ?Sized>(config: &RunConfig, api: &A) -> Result<RunReport, RunError> {
    if let Some(report) = check_input(config) {
        return Ok(report);
    }
    let purchases =
        purchase::read_purchases(&config.purchases_path).map_err(|error| RunError::Input {
            path: config.purchases_path.clone(),
            error,
        })?;

    let store = CacheStore::new(&config.cache_path);
    let cache = sync_cache(&store, api).await?;

    let matches = Matcher::new(config.matching).find_matches(&purchases, &cache.transactions);
    tracing::info!(
        "Matched {} of {} purchases against {} transactions",
        matches.len(),
        purchases.len(),
        cache.transactions.len()
    );

    let updates = UpdateApplier::new(api, config.dry_run)
        .apply_all(&matches)
        .await;

    Ok(RunReport::Completed(RunSummary {
        purchases: purchases.len(),
        transactions: cache.transactions.len(),
        updates,
    }))
}
