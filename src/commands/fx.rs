// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{print_guard, rate_from_args};
use crate::fx::resolver::resolve_choice;
use crate::fx::{
    CurrencyCode, DisplayMode, Money, RateChoice, RateType, convert, display_rate, from_usd, to_usd,
};
use crate::utils::{Settings, load_catalog, parse_currency, parse_date, parse_decimal};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("to-usd", sub)) => to_usd_cmd(conn, sub)?,
        Some(("from-usd", sub)) => from_usd_cmd(conn, sub)?,
        Some(("convert", sub)) => convert_cmd(conn, sub)?,
        Some(("display-rate", sub)) => display_rate_cmd(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn unconvertible(currency: &CurrencyCode) {
    eprintln!("warning: no usable rate for {}; result is 0", currency);
}

fn to_usd_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let currency = parse_currency(sub.get_one::<String>("currency").unwrap())?;
    let picked = rate_from_args(conn, &settings, &currency, sub)?;
    if let Some(g) = &picked.guard {
        print_guard(g);
    }
    let usd = to_usd(amount, &currency, picked.rate);
    println!("{} -> {}", Money::new(amount, currency), Money::usd(usd));
    Ok(())
}

fn from_usd_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let currency = parse_currency(sub.get_one::<String>("currency").unwrap())?;
    let picked = rate_from_args(conn, &settings, &currency, sub)?;
    if let Some(g) = &picked.guard {
        print_guard(g);
    }
    let out = from_usd(amount, &currency, picked.rate);
    println!("{} -> {}", Money::usd(amount), Money::new(out, currency));
    Ok(())
}

fn convert_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let from = parse_currency(sub.get_one::<String>("from").unwrap())?;
    let to = parse_currency(sub.get_one::<String>("to").unwrap())?;
    let as_of = match sub.get_one::<String>("date") {
        Some(d) => Some(parse_date(d)?),
        None => None,
    };
    let pick = |ccy: &CurrencyCode, key: &str| -> Result<Option<Decimal>> {
        let choice = match sub.get_one::<String>(key) {
            Some(t) => Some(RateChoice::Catalog(t.parse::<RateType>()?)),
            None => None,
        };
        let catalog = load_catalog(conn, &settings.user, ccy, as_of)?;
        Ok(resolve_choice(ccy, &catalog, choice.as_ref(), true))
    };
    let from_rate = pick(&from, "from-type")?;
    let to_rate = pick(&to, "to-type")?;
    if from != to {
        for (ccy, r) in [(&from, from_rate), (&to, to_rate)] {
            if r.is_none() && !ccy.is_usd() {
                unconvertible(ccy);
            }
        }
    }
    let res = convert(amount, &from, from_rate, &to, to_rate);
    println!("{} -> {}", Money::new(amount, from), Money::new(res, to));
    Ok(())
}

fn display_rate_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let currency = parse_currency(sub.get_one::<String>("currency").unwrap())?;
    let mode: DisplayMode = sub
        .get_one::<String>("mode")
        .unwrap()
        .parse()
        .map_err(anyhow::Error::msg)?;
    let choice = match sub.get_one::<String>("type") {
        Some(t) => Some(RateChoice::Catalog(t.parse::<RateType>()?)),
        None => None,
    };
    let catalog = load_catalog(conn, &settings.user, &currency, None)?;
    let rate = resolve_choice(&currency, &catalog, choice.as_ref(), true);
    let shown = display_rate(rate, &currency, mode);
    let unit = match mode {
        DisplayMode::ForeignToUsd if !currency.is_crypto() => format!("USD/{}", currency),
        _ => currency.quotation_convention().unit_label(currency.as_str()),
    };
    println!("{} {}", shown.round_dp(8).normalize(), unit);
    Ok(())
}
