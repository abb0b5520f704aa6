// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{print_guard, rate_from_args};
use crate::fx::{Aggregate, CurrencyCode, MoneyRecord, RecordKind, aggregate, aggregate_by, resolve_rate};
use crate::models::{StoredRecord, TotalRow};
use crate::store::{RecordFilter, get_record, insert_record, list_records, update_record};
use crate::utils::{
    Settings, load_catalog, maybe_print_json, parse_currency, parse_date, parse_decimal,
    parse_month, pretty_table,
};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("total", sub)) => total(conn, sub)?,
        Some(("export", sub)) => super::exporter::export_records(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn fmt_usd(v: Option<Decimal>) -> String {
    v.map(|d| format!("{:.2}", d))
        .unwrap_or_else(|| "unconvertible".to_string())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let kind: RecordKind = sub
        .get_one::<String>("kind")
        .unwrap()
        .parse()
        .map_err(anyhow::Error::msg)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let currency = parse_currency(sub.get_one::<String>("currency").unwrap())?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Utc::now().date_naive(),
    };
    let note = sub.get_one::<String>("note").map(|s| s.as_str());

    let picked = rate_from_args(conn, &settings, &currency, sub)?;
    if let Some(g) = &picked.guard {
        print_guard(g);
    }
    let rec = MoneyRecord::with_rate(amount, currency, picked.rate, picked.rate_type);
    let id = insert_record(conn, kind, date, &rec, note)?;
    println!(
        "Recorded #{} {} {} on {} (USD {})",
        id,
        kind,
        rec.money(),
        date,
        fmt_usd(rec.amount_in_usd)
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut stored = get_record(conn, id)?;
    let before = stored.record.amount_in_usd;
    let rate_given = sub.contains_id("type") || sub.contains_id("custom");

    if let Some(c) = sub.get_one::<String>("currency") {
        let currency = parse_currency(c)?;
        let picked = rate_from_args(conn, &settings, &currency, sub)?;
        if let Some(g) = &picked.guard {
            print_guard(g);
        }
        stored
            .record
            .edit_currency(currency, picked.rate, picked.rate_type);
    } else if rate_given {
        let currency = stored.record.currency.clone();
        let picked = rate_from_args(conn, &settings, &currency, sub)?;
        if let Some(g) = &picked.guard {
            print_guard(g);
        }
        stored.record.edit_rate(picked.rate, picked.rate_type);
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        stored.record.edit_amount(parse_decimal(a)?);
    }
    update_record(conn, id, &stored.record)?;
    println!(
        "Updated #{}: {} (USD {} -> {})",
        id,
        stored.record.money(),
        fmt_usd(before),
        fmt_usd(stored.record.amount_in_usd)
    );
    Ok(())
}

fn filter_from(sub: &clap::ArgMatches) -> Result<RecordFilter> {
    Ok(RecordFilter {
        kind: match sub.get_one::<String>("kind") {
            Some(k) => Some(k.parse().map_err(anyhow::Error::msg)?),
            None => None,
        },
        month: match sub.get_one::<String>("month") {
            Some(m) => Some(parse_month(m)?),
            None => None,
        },
        limit: sub.try_get_one::<usize>("limit").ok().flatten().copied(),
    })
}

/// Default display rate for `currency`, honouring favorites.
pub fn display_rate_for(
    conn: &Connection,
    settings: &Settings,
    currency: &CurrencyCode,
) -> Result<Option<Decimal>> {
    let catalog = load_catalog(conn, &settings.user, currency, None)?;
    Ok(resolve_rate(currency, &catalog, true).selected_rate())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let settings = Settings::load(conn)?;
    let data = list_records(conn, &filter_from(sub)?)?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    let shown_in = match sub.get_one::<String>("currency") {
        Some(c) => Some(parse_currency(c)?),
        None => None,
    };
    let shown_rate = match &shown_in {
        Some(c) => display_rate_for(conn, &settings, c)?,
        None => None,
    };
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|r| {
            let mut row = vec![
                r.id.to_string(),
                r.date.to_string(),
                r.kind.to_string(),
                r.record.money().to_string(),
                r.record
                    .recorded_rate_type
                    .as_ref()
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                r.record
                    .recorded_rate
                    .map(|d| d.normalize().to_string())
                    .unwrap_or_default(),
                fmt_usd(r.record.amount_in_usd),
            ];
            if let Some(target) = &shown_in {
                row.push(
                    r.record
                        .redisplay(target, shown_rate)
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "unconvertible".to_string()),
                );
            }
            row.push(r.note.clone().unwrap_or_default());
            row
        })
        .collect();
    let shown_hdr = shown_in.as_ref().map(|c| format!("In {}", c));
    let mut headers = vec!["Id", "Date", "Kind", "Amount", "Rate type", "Rate", "USD"];
    if let Some(h) = &shown_hdr {
        headers.push(h.as_str());
    }
    headers.push("Note");
    println!("{}", pretty_table(&headers, rows));
    Ok(())
}

fn total_row(group: String, a: &Aggregate) -> TotalRow {
    TotalRow {
        group,
        total: a.total.to_string(),
        currency: a.total.currency.to_string(),
        usd_total: format!("{:.2}", a.usd_total),
        included: a.included,
        skipped: a.skipped,
    }
}

fn total(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let settings = Settings::load(conn)?;
    let display = match sub.get_one::<String>("currency") {
        Some(c) => parse_currency(c)?,
        None => settings.display_currency.clone(),
    };
    let stored = list_records(conn, &filter_from(sub)?)?;
    let by = sub.get_one::<String>("by").map(|s| s.as_str());
    let rows = totals(conn, &settings, &stored, &display, by)?;

    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let skipped: usize = rows.iter().map(|r| r.skipped).sum();
        let table = rows
            .into_iter()
            .map(|r| vec![r.group, r.total, r.usd_total, r.included.to_string()])
            .collect();
        let total_hdr = format!("Total ({})", display);
        println!(
            "{}",
            pretty_table(&["Group", total_hdr.as_str(), "USD", "Records"], table)
        );
        if skipped > 0 {
            println!("{} record(s) without a USD value were left out.", skipped);
        }
    }
    Ok(())
}

/// Totals grouped by `by` (`month`, `kind` or everything), one display rate for all groups.
pub fn totals(
    conn: &Connection,
    settings: &Settings,
    stored: &[StoredRecord],
    target: &CurrencyCode,
    by: Option<&str>,
) -> Result<Vec<TotalRow>> {
    let rate = display_rate_for(conn, settings, target)?;
    if rate.is_none() && !target.is_usd() {
        tracing::warn!(currency = %target, "no rate for display currency, totals will read 0");
    }
    let rows = match by {
        Some("month") => aggregate_by(stored, |s| &s.record, |s| s.month(), target, |_| rate)
            .into_iter()
            .map(|(k, a)| total_row(k, &a))
            .collect(),
        Some("kind") => aggregate_by(stored, |s| &s.record, |s| s.kind, target, |_| rate)
            .into_iter()
            .map(|(k, a)| total_row(k.to_string(), &a))
            .collect(),
        _ => {
            let records: Vec<MoneyRecord> = stored.iter().map(|s| s.record.clone()).collect();
            vec![total_row("all".to_string(), &aggregate(&records, target, |_| rate))]
        }
    };
    Ok(rows)
}
