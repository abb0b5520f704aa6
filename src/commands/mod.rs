// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod config;
pub mod doctor;
pub mod exporter;
pub mod favorites;
pub mod fx;
pub mod rates;
pub mod records;

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::fx::rates::validate_custom_rate;
use crate::fx::{
    CurrencyCode, GuardOutcome, RateCatalog, RateChoice, RateTag, RateType, accept_custom_rate,
};
use crate::fx::resolver::resolve_choice;
use crate::utils::{Settings, load_catalog, parse_date};

/// The rate a command ended up with for one currency.
#[derive(Debug, Clone, Serialize)]
pub struct PickedRate {
    pub rate: Option<Decimal>,
    pub rate_type: Option<RateTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<GuardOutcome>,
}

/// Reads `--type`, `--custom`, `--declared` and `--date` and resolves a rate.
///
/// Without `--type` or `--custom` the default selection applies.
pub fn rate_from_args(
    conn: &Connection,
    settings: &Settings,
    currency: &CurrencyCode,
    sub: &clap::ArgMatches,
) -> Result<PickedRate> {
    let as_of = match sub.get_one::<String>("date") {
        Some(d) => Some(parse_date(d)?),
        None => None,
    };
    let catalog = load_catalog(conn, &settings.user, currency, as_of)?;

    if let Some(raw) = sub.get_one::<String>("custom") {
        let entered = validate_custom_rate(raw)?;
        let declared = match sub.get_one::<String>("declared") {
            Some(t) => Some(t.parse::<RateType>()?),
            None => None,
        };
        let mut guard = settings.guard();
        let Some(custom) =
            accept_custom_rate(&mut guard, currency, entered, declared.as_ref(), &catalog)
        else {
            return Err(crate::fx::FxError::InvalidCustomInput(raw.clone()).into());
        };
        return Ok(PickedRate {
            rate: Some(custom.system),
            rate_type: Some(RateTag::Custom),
            guard: Some(custom.outcome),
        });
    }

    let choice = match sub.get_one::<String>("type") {
        Some(t) => Some(RateChoice::Catalog(t.parse::<RateType>()?)),
        None => None,
    };
    let rate = resolve_choice(currency, &catalog, choice.as_ref(), true);
    let rate_type = match &choice {
        Some(c) => Some(c.rate_tag()),
        None => crate::fx::resolve_rate(currency, &catalog, true)
            .selected
            .map(|o| o.choice.rate_tag()),
    };
    if rate.is_none() {
        if let Some(msg) = missing_rate_warning(currency, choice.as_ref(), &catalog) {
            eprintln!("warning: {}", msg);
        }
    }
    Ok(PickedRate {
        rate,
        rate_type,
        guard: None,
    })
}

/// What to tell the user when `currency` ended up without a rate. USD never needs one.
pub fn missing_rate_warning(
    currency: &CurrencyCode,
    choice: Option<&RateChoice>,
    catalog: &RateCatalog,
) -> Option<String> {
    if currency.is_usd() {
        return None;
    }
    let msg = match choice {
        Some(RateChoice::Catalog(t)) => match catalog.require(t) {
            Err(e) => e.to_string(),
            Ok(_) => return None,
        },
        _ => format!("no usable rate for {}; amounts in it convert to 0", currency),
    };
    Some(msg)
}

pub fn print_guard(outcome: &GuardOutcome) {
    match outcome {
        GuardOutcome::Corrected { original, corrected } => eprintln!(
            "note: custom rate {} matches the catalog rate in stored convention; using 1/{} = {}",
            original,
            original,
            corrected.round_dp(8)
        ),
        GuardOutcome::Suspected { rate, suggested } => eprintln!(
            "warning: custom rate {} looks inverted; did you mean {}?",
            rate,
            suggested.round_dp(8)
        ),
        _ => {}
    }
}
