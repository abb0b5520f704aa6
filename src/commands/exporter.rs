// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

use crate::store::{RecordFilter, list_records};

fn opt(d: Option<rust_decimal::Decimal>) -> String {
    d.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes every record, oldest first, with its stored USD snapshot.
pub fn export_records(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut data = list_records(conn, &RecordFilter::default())?;
    data.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "kind",
                "date",
                "amount",
                "currency",
                "recorded_rate",
                "recorded_rate_type",
                "amount_in_usd",
                "note",
            ])?;
            for r in &data {
                wtr.write_record([
                    r.id.to_string(),
                    r.kind.to_string(),
                    r.date.to_string(),
                    r.record.amount.to_string(),
                    r.record.currency.to_string(),
                    opt(r.record.recorded_rate),
                    r.record
                        .recorded_rate_type
                        .as_ref()
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                    opt(r.record.amount_in_usd),
                    r.note.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = data
                .iter()
                .map(|r| {
                    json!({
                        "id": r.id,
                        "kind": r.kind,
                        "date": r.date.to_string(),
                        "amount": r.record.amount.to_string(),
                        "currency": r.record.currency,
                        "recorded_rate": r.record.recorded_rate.map(|d| d.to_string()),
                        "recorded_rate_type": r.record.recorded_rate_type,
                        "amount_in_usd": r.record.amount_in_usd.map(|d| d.to_string()),
                        "note": r.note,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => anyhow::bail!("Unknown format: {} (use csv|json)", other),
    }
    tracing::info!(count = data.len(), out = %out, "records exported");
    println!("Exported {} records to {}", data.len(), out);
    Ok(())
}
