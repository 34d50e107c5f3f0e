use crate::Decimal;
use crate::error::MalformedRecord;
use crate::ledger::Milliunits;
use chrono::{Days, NaiveDate};
use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::ToPrimitive;
use std::ops::RangeInclusive;

/// Inclusive window of ledger posting dates a purchase may match.
pub fn match_window(date: NaiveDate, days: u32) -> RangeInclusive<NaiveDate> {
    let days = Days::new(u64::from(days));
    let start = date.checked_sub_days(days).unwrap_or(NaiveDate::MIN);
    let end = date.checked_add_days(days).unwrap_or(NaiveDate::MAX);
    start..=end
}

/// Exact conversion to milliunits, rounding half away from zero.
pub fn to_milliunits(amount: Decimal) -> Result<Milliunits, MalformedRecord> {
    amount
        .checked_mul(Decimal::ONE_THOUSAND)
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|scaled| scaled.to_i64())
        .ok_or_else(|| MalformedRecord::Amount(amount.to_string()))
}

pub fn transaction_matches(
    window: &RangeInclusive<NaiveDate>,
    target: Milliunits,
    posted_on: NaiveDate,
    amount: Milliunits,
) -> bool {
    window.contains(&posted_on) && amount == target
}
