//! Writing memos back to matched ledger transactions.

use crate::error::RemoteError;
use crate::purchase::PurchaseRecord;
use crate::reconcile::MatchResult;
use crate::remote::LedgerApi;
use std::fmt;

/// Longest memo the ledger service accepts.
pub const MEMO_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    Simulated,
    Failed(String),
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::Applied => f.write_str("applied"),
            UpdateOutcome::Simulated => f.write_str("dry run"),
            UpdateOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedUpdate {
    pub transaction_id: String,
    pub order_id: Option<String>,
    pub memo: String,
    pub outcome: UpdateOutcome,
}

/// The memo written for a purchase: its description on one line, or the order number.
pub fn memo_for(purchase: &PurchaseRecord) -> String {
    let memo = match &purchase.description {
        Some(description) => description.split_whitespace().collect::<Vec<_>>().join(" "),
        None => String::new(),
    };
    let memo = if memo.is_empty() {
        match &purchase.order_id {
            Some(order_id) => format!("Amazon order {order_id}"),
            None => "Amazon order".to_owned(),
        }
    } else {
        memo
    };

    match memo.char_indices().nth(MEMO_MAX_CHARS) {
        Some((cut, _)) => memo[..cut].to_owned(),
        None => memo,
    }
}

pub struct UpdateApplier<'a, A: ?Sized> {
    api: &'a A,
    dry_run: bool,
}

impl<'a, A: LedgerApi + ?Sized> UpdateApplier<'a, A> {
    pub fn new(api: &'a A, dry_run: bool) -> Self {
        UpdateApplier { api, dry_run }
    }

    /// Write the full memo for one match. Never fails: errors become `UpdateOutcome::Failed`.
    pub async fn apply(&self, matched: &MatchResult) -> AppliedUpdate {
        let transaction_id = &matched.transaction.id;
        let memo = memo_for(&matched.purchase);

        let outcome = if self.dry_run {
            tracing::info!("Would update transaction {transaction_id} with memo: {memo}");
            UpdateOutcome::Simulated
        } else {
            tracing::info!("Updating transaction {transaction_id} with memo: {memo}");
            match self.api.patch_memo(transaction_id, &memo).await {
                Ok(()) => UpdateOutcome::Applied,
                Err(RemoteError::Timeout) => {
                    tracing::warn!("Updating transaction {transaction_id} timed out");
                    UpdateOutcome::Failed("timeout".to_owned())
                }
                Err(error) => {
                    let reason = format!("{:#}", anyhow::Error::new(error));
                    tracing::warn!("Failed to update transaction {transaction_id}: {reason}");
                    UpdateOutcome::Failed(reason)
                }
            }
        };

        AppliedUpdate {
            transaction_id: transaction_id.clone(),
            order_id: matched.purchase.order_id.clone(),
            memo,
            outcome,
        }
    }

    /// Apply every match in order; a failed update does not stop the rest.
    pub async fn apply_all(&self, matches: &[MatchResult]) -> Vec<AppliedUpdate> {
        let mut updates = Vec::with_capacity(matches.len());
        for matched in matches {
            updates.push(self.apply(matched).await);
        }
        updates
    }
}
