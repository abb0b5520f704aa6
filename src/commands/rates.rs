// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::fx::{ExchangeRate, RateType, resolve_rate};
use crate::store::{add_rate, list_rates};
use crate::utils::{
    Settings, load_catalog, maybe_print_json, parse_currency, parse_date, parse_decimal,
    pretty_table,
};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("resolve", sub)) => resolve(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let currency = parse_currency(sub.get_one::<String>("currency").unwrap())?;
    let rate_type: RateType = sub.get_one::<String>("type").unwrap().parse()?;
    let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
    if rate <= Decimal::ZERO {
        anyhow::bail!("Rate must be positive, got {}", rate);
    }
    if currency.is_usd() {
        anyhow::bail!("USD is the pivot currency and has no rate");
    }
    let as_of = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Utc::now().date_naive(),
    };
    add_rate(conn, &ExchangeRate::new(currency.clone(), rate_type.clone(), rate, as_of))?;
    println!(
        "Stored {} {} rate {} {} on {}",
        currency,
        rate_type,
        rate,
        currency.quotation_convention().unit_label(currency.as_str()),
        as_of
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => Some(parse_currency(c)?),
        None => None,
    };
    let data = list_rates(conn, currency.as_ref())?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .into_iter()
            .map(|r| vec![r.as_of, r.currency, r.rate_type, r.rate])
            .collect();
        println!("{}", pretty_table(&["Date", "Currency", "Type", "Rate"], rows));
    }
    Ok(())
}

fn resolve(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let settings = Settings::load(conn)?;
    let currency = parse_currency(sub.get_one::<String>("currency").unwrap())?;
    let as_of = match sub.get_one::<String>("date") {
        Some(d) => Some(parse_date(d)?),
        None => None,
    };
    let catalog = load_catalog(conn, &settings.user, &currency, as_of)?;
    let res = resolve_rate(&currency, &catalog, sub.get_flag("prefer-favorites"));
    if maybe_print_json(json_flag, jsonl_flag, &res)? {
        return Ok(());
    }
    let rows = res
        .options
        .iter()
        .map(|o| {
            let mark = if res.selected.as_ref() == Some(o) { "*" } else { "" };
            vec![
                mark.to_string(),
                o.choice.tag().to_string(),
                o.rate.map(|r| r.normalize().to_string()).unwrap_or_default(),
                o.label.clone(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["", "Type", "Rate", "Option"], rows));
    if res.selected.is_none() {
        println!("No rate available for {}; amounts in it are unconvertible.", currency);
    }
    Ok(())
}
