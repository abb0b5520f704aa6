// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::fx::guard::detect_inversion;
use crate::fx::{CurrencyCode, RateCatalog, to_usd};
use crate::models::StoredRecord;
use crate::store::{RecordFilter, list_records, record_currencies};
use crate::utils::{Settings, load_catalog, pretty_table};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub issue: String,
    pub detail: String,
}

impl Issue {
    fn new(issue: &str, detail: String) -> Self {
        Self {
            issue: issue.to_string(),
            detail,
        }
    }
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = diagnose(conn)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|i| vec![i.issue, i.detail]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(conn: &Connection) -> Result<Vec<Issue>> {
    let settings = Settings::load(conn)?;
    let mut issues = Vec::new();
    let mut catalogs: BTreeMap<CurrencyCode, RateCatalog> = BTreeMap::new();

    // 1) Currencies in use with nothing in the catalog
    for ccy in record_currencies(conn)? {
        if ccy.is_usd() {
            continue;
        }
        let catalog = load_catalog(conn, &settings.user, &ccy, None)?;
        if catalog.is_empty() {
            issues.push(Issue::new("no_rate", ccy.to_string()));
        }
        catalogs.insert(ccy, catalog);
    }

    let guard = settings.guard();
    for r in list_records(conn, &RecordFilter::default())? {
        // 2) No USD snapshot, so left out of every total
        let Some(usd) = r.record.amount_in_usd else {
            issues.push(Issue::new("unconvertible_record", describe(&r)));
            continue;
        };
        // 3) Snapshot no longer matches amount and rate
        if !r.record.currency.is_usd() {
            let expected = to_usd(r.record.amount, &r.record.currency, r.record.recorded_rate);
            if expected != usd {
                issues.push(Issue::new(
                    "stale_snapshot",
                    format!("{} (stored {}, expected {})", describe(&r), usd, expected),
                ));
            }
        }
        // 4) Custom fiat rates whose human form equals a catalog rate
        if !r.record.recorded_rate_type.as_ref().is_some_and(|t| t.is_custom())
            || r.record.currency.is_crypto()
        {
            continue;
        }
        let (Some(system), Some(catalog)) = (r.record.recorded_rate, catalogs.get(&r.record.currency))
        else {
            continue;
        };
        let Some(display) = Decimal::ONE.checked_div(system) else {
            continue;
        };
        for rate in catalog.rates() {
            if detect_inversion(display, rate.rate, guard.tolerance()).is_some() {
                issues.push(Issue::new(
                    "custom_rate_inverted",
                    format!("{} looks like {} {} typed in the wrong direction", describe(&r), rate.rate_type, rate.rate),
                ));
                break;
            }
        }
    }
    tracing::debug!(count = issues.len(), "doctor finished");
    Ok(issues)
}

fn describe(r: &StoredRecord) -> String {
    format!("#{} {} {} {}", r.id, r.date, r.kind, r.record.money())
}
