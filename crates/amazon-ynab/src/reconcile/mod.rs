//! Pairing purchases with ledger transactions by posting date and exact amount.

pub mod matching;

use crate::error::MalformedRecord;
use crate::ledger::{LedgerTransaction, Milliunits};
use crate::purchase::PurchaseRecord;
use chrono::NaiveDate;
use serde::Deserialize;

pub const DEFAULT_WINDOW_DAYS: u32 = 3;

/// What to do when several ledger transactions fit one purchase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmbiguityPolicy {
    /// Take the first candidate in ledger order.
    #[default]
    FirstMatch,
    /// Leave the purchase unmatched.
    Skip,
}

/// How a purchase amount maps onto the ledger's sign convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PurchaseSign {
    /// Purchases are money leaving the account, which the ledger records as negative.
    #[default]
    Outflow,
    /// Compare the purchase amount as written.
    AsRecorded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub window_days: u32,
    pub ambiguity: AmbiguityPolicy,
    pub purchase_sign: PurchaseSign,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            window_days: DEFAULT_WINDOW_DAYS,
            ambiguity: AmbiguityPolicy::default(),
            purchase_sign: PurchaseSign::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub purchase: PurchaseRecord,
    pub transaction: LedgerTransaction,
}

struct Candidate<'a> {
    transaction: &'a LedgerTransaction,
    posted_on: NaiveDate,
    consumed: bool,
}

pub struct Matcher {
    config: MatchConfig,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Self {
        Matcher { config }
    }

    fn target_amount(&self, purchase: &PurchaseRecord) -> Option<Milliunits> {
        let amount = purchase.amount?;
        let target = matching::to_milliunits(amount).and_then(|milliunits| {
            let signed = match self.config.purchase_sign {
                PurchaseSign::Outflow => milliunits.checked_neg(),
                PurchaseSign::AsRecorded => Some(milliunits),
            };
            signed.ok_or_else(|| MalformedRecord::Amount(amount.to_string()))
        });
        match target {
            Ok(milliunits) => Some(milliunits),
            Err(error) => {
                tracing::warn!("Skipping {}: {error}", purchase.label());
                None
            }
        }
    }

    /// Pair each purchase with at most one transaction, in purchase order.
    ///
    /// A transaction is consumed by the first purchase it is paired with and is not
    /// offered to later purchases.
    pub fn find_matches(
        &self,
        purchases: &[PurchaseRecord],
        transactions: &[LedgerTransaction],
    ) -> Vec<MatchResult> {
        let mut pool = candidate_pool(transactions);
        let mut results = Vec::new();

        for purchase in purchases {
            if !purchase.is_matchable() {
                continue;
            }
            let Some(target) = self.target_amount(purchase) else {
                continue;
            };
            let window = matching::match_window(purchase.date, self.config.window_days);

            let mut fitting = pool.iter().enumerate().filter(|(_, candidate)| {
                !candidate.consumed
                    && matching::transaction_matches(
                        &window,
                        target,
                        candidate.posted_on,
                        candidate.transaction.amount,
                    )
            });
            let Some((first, _)) = fitting.next() else {
                tracing::debug!("No transaction for {}", purchase.label());
                continue;
            };
            let others: Vec<&str> = fitting
                .map(|(_, candidate)| candidate.transaction.id.as_str())
                .collect();

            if !others.is_empty() {
                match self.config.ambiguity {
                    AmbiguityPolicy::FirstMatch => {
                        tracing::warn!(
                            "Ambiguous match for {}: using {}, also fits {}",
                            purchase.label(),
                            pool[first].transaction.id,
                            others.join(", ")
                        );
                    }
                    AmbiguityPolicy::Skip => {
                        tracing::warn!(
                            "Ambiguous match for {}: {} and {} all fit, skipping",
                            purchase.label(),
                            pool[first].transaction.id,
                            others.join(", ")
                        );
                        continue;
                    }
                }
            }

            let candidate = &mut pool[first];
            candidate.consumed = true;
            tracing::debug!("Matched {} to {}", purchase.label(), candidate.transaction.id);
            results.push(MatchResult {
                purchase: purchase.clone(),
                transaction: candidate.transaction.clone(),
            });
        }

        results
    }
}

fn candidate_pool(transactions: &[LedgerTransaction]) -> Vec<Candidate<'_>> {
    transactions
        .iter()
        .filter(|transaction| !transaction.deleted)
        .filter_map(|transaction| match transaction.posted_on() {
            Ok(posted_on) => Some(Candidate {
                transaction,
                posted_on,
                consumed: false,
            }),
            Err(error) => {
                tracing::warn!("Ignoring ledger transaction {}: {error}", transaction.id);
                None
            }
        })
        .collect()
}
