// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Picks the effective rate for a currency out of a catalog snapshot.
//!
//! Default: the official rate when one exists, else the first rate in catalog
//! order. With `prefer_favorites` the catalog order is first permuted so that
//! favorited types lead, in the user's favorite order. A `custom` option is
//! always appended; it never resolves against the catalog.
//!
//! Resolutions are not meant to be cached across catalog refreshes. Re-run
//! `resolve_rate` against the newest snapshot.

use rust_decimal::Decimal;
use serde::Serialize;

use super::convert::{DisplayMode, display_rate};
use super::currency::CurrencyCode;
use super::rates::{ExchangeRate, RateCatalog, RateChoice, RateType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateOption {
    pub choice: RateChoice,
    /// `None` only for the custom slot before a value is typed.
    pub rate: Option<Decimal>,
    pub label: String,
    pub favorite: bool,
}

impl RateOption {
    fn from_rate(r: &ExchangeRate, favorite: bool) -> Self {
        let conv = r.currency.quotation_convention();
        let shown = display_rate(Some(r.rate), &r.currency, DisplayMode::UsdToForeign);
        let star = if favorite { " ★" } else { "" };
        Self {
            choice: RateChoice::Catalog(r.rate_type.clone()),
            rate: Some(r.rate),
            label: format!(
                "{}{} ({} {}, {})",
                r.rate_type.label(),
                star,
                shown.normalize(),
                conv.unit_label(r.currency.as_str()),
                r.as_of
            ),
            favorite,
        }
    }

    /// The empty custom slot every picker ends with.
    fn custom() -> Self {
        Self {
            choice: RateChoice::Custom(Decimal::ZERO),
            rate: None,
            label: "Custom".to_string(),
            favorite: false,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.choice, RateChoice::Custom(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub currency: CurrencyCode,
    /// Default pick. `None` means the currency is unconvertible for now.
    pub selected: Option<RateOption>,
    pub options: Vec<RateOption>,
}

impl Resolution {
    pub fn selected_rate(&self) -> Option<Decimal> {
        self.selected.as_ref().and_then(|o| o.rate)
    }

    pub fn is_convertible(&self) -> bool {
        self.selected_rate().is_some()
    }

    pub fn option(&self, t: &RateType) -> Option<&RateOption> {
        self.options
            .iter()
            .find(|o| matches!(&o.choice, RateChoice::Catalog(ct) if ct == t))
    }

    /// Rate for an explicit user pick, falling back to nothing rather than the default.
    pub fn rate_for(&self, choice: &RateChoice) -> Option<Decimal> {
        match choice {
            RateChoice::Custom(v) => Some(*v).filter(|v| *v > Decimal::ZERO),
            RateChoice::Catalog(t) => self.option(t).and_then(|o| o.rate),
        }
    }
}

/// Orders catalog rates with favorites first, keeping source order otherwise.
pub fn order_by_favorites<'a>(catalog: &'a RateCatalog) -> Vec<&'a ExchangeRate> {
    let mut rates: Vec<&ExchangeRate> = catalog.rates().iter().collect();
    let rank = |r: &ExchangeRate| {
        catalog
            .favorites()
            .iter()
            .position(|f| f == &r.rate_type)
            .unwrap_or(usize::MAX)
    };
    // stable sort keeps catalog order among non-favorites
    rates.sort_by_key(|r| rank(*r));
    rates
}

/// Builds the rate picker for `currency` and chooses its default.
pub fn resolve_rate(
    currency: &CurrencyCode,
    catalog: &RateCatalog,
    prefer_favorites: bool,
) -> Resolution {
    if currency.is_usd() {
        let par = RateOption {
            choice: RateChoice::Catalog(RateType::Official),
            rate: Some(Decimal::ONE),
            label: "Par (1 USD/USD)".to_string(),
            favorite: false,
        };
        return Resolution {
            currency: currency.clone(),
            selected: Some(par.clone()),
            options: vec![par, RateOption::custom()],
        };
    }

    let ordered: Vec<&ExchangeRate> = if prefer_favorites {
        order_by_favorites(catalog)
    } else {
        catalog.rates().iter().collect()
    };
    let mut options: Vec<RateOption> = ordered
        .iter()
        .map(|r| RateOption::from_rate(r, catalog.is_favorite(&r.rate_type)))
        .collect();

    let selected = options
        .iter()
        .find(|o| o.choice == RateChoice::Catalog(RateType::Official))
        .or_else(|| options.first())
        .cloned();
    if selected.is_none() {
        tracing::debug!(%currency, "no usable rate in catalog, currency is unconvertible");
    }

    options.push(RateOption::custom());
    Resolution {
        currency: currency.clone(),
        selected,
        options,
    }
}

/// Resolves a caller-provided choice; custom values bypass the catalog.
pub fn resolve_choice(
    currency: &CurrencyCode,
    catalog: &RateCatalog,
    choice: Option<&RateChoice>,
    prefer_favorites: bool,
) -> Option<Decimal> {
    let res = resolve_rate(currency, catalog, prefer_favorites);
    match choice {
        Some(c) => res.rate_for(c),
        None => res.selected_rate(),
    }
}
