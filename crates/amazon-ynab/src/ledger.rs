use crate::error::MalformedRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger amounts are integers at 1/1000 of the currency unit.
pub type Milliunits = i64;

/// The server's change cursor ("server knowledge"). Opaque to everything but the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub i64);

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A transaction as returned by the budgeting service.
///
/// Only the fields the matcher and applier need are typed; everything else is
/// carried through `extra` so the cache stays a faithful copy of the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: String,
    /// `YYYY-MM-DD`, kept as received.
    pub date: String,
    pub amount: Milliunits,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LedgerTransaction {
    pub fn new(id: impl Into<String>, date: impl Into<String>, amount: Milliunits) -> Self {
        LedgerTransaction {
            id: id.into(),
            date: date.into(),
            amount,
            memo: None,
            deleted: false,
            extra: serde_json::Map::new(),
        }
    }

    pub fn posted_on(&self) -> Result<NaiveDate, MalformedRecord> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| MalformedRecord::Date(self.date.clone()))
    }
}
