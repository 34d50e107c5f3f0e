pub mod apply;
pub mod cache;
pub mod error;
pub mod ledger;
pub mod purchase;
pub mod reconcile;
pub mod remote;
pub mod run;
pub mod sync;
#[cfg(test)]
mod testing;

pub type Decimal = rust_decimal::Decimal;

pub use anyhow::Result;
pub use apply::{AppliedUpdate, UpdateApplier, UpdateOutcome};
pub use cache::{CacheStore, SyncCache};
pub use error::{MalformedRecord, RemoteError, RunError};
pub use ledger::{Cursor, LedgerTransaction, Milliunits};
pub use purchase::PurchaseRecord;
pub use reconcile::{AmbiguityPolicy, MatchConfig, MatchResult, Matcher, PurchaseSign};
pub use remote::{LedgerApi, TransactionsPage, YnabClient};
pub use run::{RunConfig, RunReport, RunSummary, check_input, run};
