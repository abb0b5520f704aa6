// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Multi-record totals.
//!
//! A total is the sum of each record's stored `amount_in_usd`, converted once
//! into the display currency with one rate. Records are never re-rated here and
//! display-currency values are never summed.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::convert::from_usd;
use super::currency::CurrencyCode;
use super::money::{Money, MoneyRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub total: Money,
    pub usd_total: Decimal,
    pub included: usize,
    /// Records left out of the total: no USD snapshot, or one that would
    /// overflow the running sum.
    pub skipped: usize,
}

fn usd_sum<'a, I>(records: I) -> (Decimal, usize, usize)
where
    I: IntoIterator<Item = &'a MoneyRecord>,
{
    let mut sum = Decimal::ZERO;
    let (mut included, mut skipped) = (0, 0);
    for r in records {
        match r.amount_in_usd.map(|v| sum.checked_add(v)) {
            Some(Some(next)) => {
                sum = next;
                included += 1;
            }
            Some(None) => {
                tracing::warn!(currency = %r.currency, amount = %r.amount, "USD total overflowed, record left out");
                skipped += 1;
            }
            None => skipped += 1,
        }
    }
    (sum, included, skipped)
}

fn finish(usd_total: Decimal, included: usize, skipped: usize, display: &CurrencyCode, rate: Option<Decimal>) -> Aggregate {
    Aggregate {
        total: Money::new(from_usd(usd_total, display, rate), display.clone()),
        usd_total,
        included,
        skipped,
    }
}

/// Totals `records` in `display`. `resolve` is asked once for the display rate.
pub fn aggregate<F>(records: &[MoneyRecord], display: &CurrencyCode, resolve: F) -> Aggregate
where
    F: FnOnce(&CurrencyCode) -> Option<Decimal>,
{
    let (usd_total, included, skipped) = usd_sum(records);
    if skipped > 0 {
        tracing::debug!(skipped, "records without a USD snapshot left out of total");
    }
    let rate = if display.is_usd() { None } else { resolve(display) };
    finish(usd_total, included, skipped, display, rate)
}

/// Grouped totals, e.g. per month or per record kind.
///
/// Every group uses the same display rate, resolved once.
pub fn aggregate_by<'a, T, K, KF, F>(
    items: &'a [T],
    record: impl Fn(&'a T) -> &'a MoneyRecord,
    key: KF,
    display: &CurrencyCode,
    resolve: F,
) -> BTreeMap<K, Aggregate>
where
    K: Ord,
    KF: Fn(&'a T) -> K,
    F: FnOnce(&CurrencyCode) -> Option<Decimal>,
{
    let mut groups: BTreeMap<K, Vec<&MoneyRecord>> = BTreeMap::new();
    for it in items {
        groups.entry(key(it)).or_default().push(record(it));
    }
    let rate = if display.is_usd() { None } else { resolve(display) };
    groups
        .into_iter()
        .map(|(k, recs)| {
            let (usd_total, included, skipped) = usd_sum(recs);
            (k, finish(usd_total, included, skipped, display, rate))
        })
        .collect()
}
