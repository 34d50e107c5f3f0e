//! Purchase records produced by the order-page extractor.

use crate::Decimal;
use crate::error::MalformedRecord;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// A purchase as written by the extractor. Every field is kept as the raw page text.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPurchase {
    #[serde(default)]
    pub date: String,
    #[serde(default, alias = "subtotal")]
    pub amount: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRecord {
    pub date: NaiveDate,
    /// `None` when the page showed no amount.
    pub amount: Option<Decimal>,
    pub order_id: Option<String>,
    pub description: Option<String>,
}

impl PurchaseRecord {
    /// Records missing an order id or an amount can never be paired with a ledger entry.
    pub fn is_matchable(&self) -> bool {
        self.order_id.is_some() && self.amount.is_some()
    }

    /// Label used in log lines.
    pub fn label(&self) -> String {
        match &self.order_id {
            Some(order_id) => format!("order {order_id} ({})", self.date),
            None => format!("order without number ({})", self.date),
        }
    }
}

impl TryFrom<RawPurchase> for PurchaseRecord {
    type Error = MalformedRecord;

    fn try_from(raw: RawPurchase) -> Result<Self, Self::Error> {
        let date = parse_purchase_date(&raw.date)?;
        let amount = parse_amount(&raw.amount)?;
        let order_id = Some(raw.order_number.trim())
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned);
        let description = raw
            .description
            .map(|description| description.trim().to_owned())
            .filter(|description| !description.is_empty());

        Ok(PurchaseRecord {
            date,
            amount,
            order_id,
            description,
        })
    }
}

/// Order pages print dates like `June 10, 2024`; ISO dates are accepted as well.
pub fn parse_purchase_date(text: &str) -> Result<NaiveDate, MalformedRecord> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%B %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .map_err(|_| MalformedRecord::Date(text.to_owned()))
}

/// Parses amounts like `$1,234.56` or `-$3.00`. Blank text yields `None`.
pub fn parse_amount(text: &str) -> Result<Option<Decimal>, MalformedRecord> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }

    Decimal::from_str(&cleaned)
        .map(Some)
        .map_err(|_| MalformedRecord::Amount(text.trim().to_owned()))
}

/// Read the extractor output and normalize it, dropping records that can't be interpreted.
pub fn read_purchases(path: &Path) -> Result<Vec<PurchaseRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read purchases file: {}", path.display()))?;
    let raw: Vec<RawPurchase> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse purchases file: {}", path.display()))?;

    Ok(normalize_purchases(raw))
}

pub fn normalize_purchases(raw: Vec<RawPurchase>) -> Vec<PurchaseRecord> {
    let total = raw.len();
    let mut purchases = Vec::with_capacity(total);
    for (index, raw) in raw.into_iter().enumerate() {
        let order_number = raw.order_number.clone();
        match PurchaseRecord::try_from(raw) {
            Ok(purchase) => purchases.push(purchase),
            Err(error) => {
                tracing::warn!("Skipping purchase #{index} (order {order_number:?}): {error}");
            }
        }
    }

    tracing::info!("Loaded {} of {total} purchases", purchases.len());
    purchases
}
