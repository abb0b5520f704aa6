// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Direction-aware conversion through the USD pivot.
//!
//! Every function here is total: a missing or non-positive rate yields zero,
//! which callers render as "unconvertible". Results are rounded to cents,
//! half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;

pub const CENT_DP: u32 = 2;

/// Rounds to cents, half away from zero.
pub fn round_cents(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(CENT_DP, RoundingStrategy::MidpointAwayFromZero)
}

fn usable(rate: Option<Decimal>) -> Option<Decimal> {
    rate.filter(|r| *r > Decimal::ZERO)
}

/// Expresses `amount` of `currency` in USD.
pub fn to_usd(amount: Decimal, currency: &CurrencyCode, rate: Option<Decimal>) -> Decimal {
    if amount.is_zero() {
        return Decimal::ZERO;
    }
    if currency.is_usd() {
        return amount;
    }
    let Some(rate) = usable(rate) else {
        return Decimal::ZERO;
    };
    round_cents(currency.quotation_convention().to_usd(amount, rate))
}

/// Expresses a USD amount in `target`.
pub fn from_usd(usd: Decimal, target: &CurrencyCode, rate: Option<Decimal>) -> Decimal {
    if usd.is_zero() {
        return Decimal::ZERO;
    }
    if target.is_usd() {
        return usd;
    }
    let Some(rate) = usable(rate) else {
        return Decimal::ZERO;
    };
    round_cents(target.quotation_convention().from_usd(usd, rate))
}

/// Converts between two currencies, always pivoting through USD.
///
/// Same-currency conversions return the amount untouched whatever the rates.
pub fn convert(
    amount: Decimal,
    source: &CurrencyCode,
    source_rate: Option<Decimal>,
    target: &CurrencyCode,
    target_rate: Option<Decimal>,
) -> Decimal {
    if source == target {
        return amount;
    }
    let usd = to_usd(amount, source, source_rate);
    if target.is_usd() {
        return round_cents(usd);
    }
    from_usd(usd, target, target_rate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// The rate as stored.
    UsdToForeign,
    /// Fiat rates flipped to USD per unit.
    ForeignToUsd,
}

impl std::str::FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usd-to-foreign" => Ok(DisplayMode::UsdToForeign),
            "foreign-to-usd" => Ok(DisplayMode::ForeignToUsd),
            other => Err(format!(
                "unknown display mode '{other}' (use usd-to-foreign|foreign-to-usd)"
            )),
        }
    }
}

/// Rate as a human should read it. Presentation only, never feed it back into math.
pub fn display_rate(rate: Option<Decimal>, currency: &CurrencyCode, mode: DisplayMode) -> Decimal {
    if currency.is_usd() {
        return Decimal::ONE;
    }
    let Some(rate) = usable(rate) else {
        return Decimal::ZERO;
    };
    if currency.is_crypto() {
        return rate;
    }
    match mode {
        DisplayMode::UsdToForeign => rate,
        DisplayMode::ForeignToUsd => Decimal::ONE.checked_div(rate).unwrap_or(Decimal::ZERO),
    }
}

/// Inverse of [`display_rate`] in `ForeignToUsd` mode: takes a human-entered
/// "USD per unit" value and returns the rate in the currency's stored convention.
pub fn system_rate_from_display(display: Decimal, currency: &CurrencyCode) -> Option<Decimal> {
    if currency.is_usd() {
        return Some(Decimal::ONE);
    }
    let display = usable(Some(display))?;
    if currency.is_crypto() {
        Some(display)
    } else {
        Decimal::ONE.checked_div(display)
    }
}
