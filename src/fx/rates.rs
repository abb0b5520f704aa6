// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;
use super::error::{FxError, FxResult};

/// Kind of rate a catalog can publish for a currency.
///
/// Sources may invent their own labels; those land in `Named`. A user-typed
/// value is never a catalog type, see [`RateChoice::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RateType {
    Official,
    Blue,
    Named(String),
}

impl RateType {
    pub fn as_str(&self) -> &str {
        match self {
            RateType::Official => "official",
            RateType::Blue => "blue",
            RateType::Named(s) => s,
        }
    }

    pub fn label(&self) -> String {
        match self {
            RateType::Official => "Official".to_string(),
            RateType::Blue => "Blue".to_string(),
            RateType::Named(s) => {
                let mut c = s.chars();
                match c.next() {
                    Some(first) => first.to_uppercase().chain(c).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

impl FromStr for RateType {
    type Err = FxError;

    fn from_str(s: &str) -> FxResult<Self> {
        let norm = s.trim().to_lowercase();
        match norm.as_str() {
            "" => Err(FxError::UnknownRateType(s.to_string())),
            "official" | "oficial" => Ok(RateType::Official),
            "blue" | "parallel" => Ok(RateType::Blue),
            // `custom` is a choice, not something a catalog can hold
            "custom" => Err(FxError::UnknownRateType(s.to_string())),
            _ => Ok(RateType::Named(norm)),
        }
    }
}

impl TryFrom<String> for RateType {
    type Error = FxError;

    fn try_from(s: String) -> FxResult<Self> {
        s.parse()
    }
}

impl From<RateType> for String {
    fn from(t: RateType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller picked in a rate picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RateChoice {
    Catalog(RateType),
    Custom(Decimal),
}

impl RateChoice {
    pub fn tag(&self) -> &str {
        match self {
            RateChoice::Catalog(t) => t.as_str(),
            RateChoice::Custom(_) => "custom",
        }
    }

    /// What a record remembers about this choice.
    pub fn rate_tag(&self) -> RateTag {
        match self {
            RateChoice::Catalog(t) => RateTag::Catalog(t.clone()),
            RateChoice::Custom(_) => RateTag::Custom,
        }
    }
}

/// Which kind of rate a record was converted with; the value itself is kept
/// next to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RateTag {
    Catalog(RateType),
    Custom,
}

impl RateTag {
    pub fn as_str(&self) -> &str {
        match self {
            RateTag::Catalog(t) => t.as_str(),
            RateTag::Custom => "custom",
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, RateTag::Custom)
    }
}

impl FromStr for RateTag {
    type Err = FxError;

    fn from_str(s: &str) -> FxResult<Self> {
        if s.trim().eq_ignore_ascii_case("custom") {
            return Ok(RateTag::Custom);
        }
        s.parse().map(RateTag::Catalog)
    }
}

impl TryFrom<String> for RateTag {
    type Error = FxError;

    fn try_from(s: String) -> FxResult<Self> {
        s.parse()
    }
}

impl From<RateTag> for String {
    fn from(t: RateTag) -> Self {
        t.as_str().to_string()
    }
}

impl From<RateType> for RateTag {
    fn from(t: RateType) -> Self {
        RateTag::Catalog(t)
    }
}

impl fmt::Display for RateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub currency: CurrencyCode,
    pub rate_type: RateType,
    pub rate: Decimal,
    pub as_of: NaiveDate,
}

impl ExchangeRate {
    pub fn new(
        currency: impl Into<CurrencyCode>,
        rate_type: RateType,
        rate: Decimal,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            currency: currency.into(),
            rate_type,
            rate,
            as_of,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.rate > Decimal::ZERO
    }
}

/// Snapshot of the rates a source knows for one currency.
///
/// Order is the source's order. Unusable rates are dropped on construction so
/// nothing downstream can select them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCatalog {
    pub currency: CurrencyCode,
    rates: Vec<ExchangeRate>,
    favorites: Vec<RateType>,
}

impl RateCatalog {
    pub fn new(currency: CurrencyCode, rates: Vec<ExchangeRate>) -> Self {
        let rates = rates
            .into_iter()
            .filter(|r| r.currency == currency && r.is_usable())
            .collect();
        Self {
            currency,
            rates,
            favorites: Vec::new(),
        }
    }

    pub fn empty(currency: CurrencyCode) -> Self {
        Self::new(currency, Vec::new())
    }

    /// Attaches the user's favorite types, most preferred first.
    pub fn with_favorites(mut self, favorites: Vec<RateType>) -> Self {
        self.favorites = favorites;
        self
    }

    pub fn rates(&self) -> &[ExchangeRate] {
        &self.rates
    }

    pub fn favorites(&self) -> &[RateType] {
        &self.favorites
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn is_favorite(&self, t: &RateType) -> bool {
        self.favorites.contains(t)
    }

    /// The first listed rate of type `t`.
    pub fn get(&self, t: &RateType) -> Option<&ExchangeRate> {
        self.rates.iter().find(|r| &r.rate_type == t)
    }

    pub fn rate_for(&self, t: &RateType) -> Option<Decimal> {
        self.get(t).map(|r| r.rate)
    }

    /// Rate value for a picker choice; custom values are returned as given.
    pub fn rate_for_choice(&self, choice: &RateChoice) -> Option<Decimal> {
        match choice {
            RateChoice::Catalog(t) => self.rate_for(t),
            RateChoice::Custom(v) if *v > Decimal::ZERO => Some(*v),
            RateChoice::Custom(_) => None,
        }
    }

    pub fn require(&self, t: &RateType) -> FxResult<&ExchangeRate> {
        self.get(t).ok_or_else(|| FxError::NoRateAvailable {
            currency: self.currency.to_string(),
            rate_type: t.to_string(),
        })
    }
}

/// Reads a user-typed custom rate.
///
/// Anything that isn't a positive number leaves `previous` in place.
pub fn parse_custom_rate(input: &str, previous: Option<Decimal>) -> Option<Decimal> {
    match input.trim().parse::<Decimal>() {
        Ok(v) if v > Decimal::ZERO => Some(v),
        _ => {
            tracing::debug!(input, "ignoring invalid custom rate input");
            previous
        }
    }
}

/// Strict variant of [`parse_custom_rate`] for callers that want to report the error.
pub fn validate_custom_rate(input: &str) -> FxResult<Decimal> {
    parse_custom_rate(input, None).ok_or_else(|| FxError::InvalidCustomInput(input.to_string()))
}
