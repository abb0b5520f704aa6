// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::convert::{from_usd, to_usd};
use super::currency::CurrencyCode;
use super::rates::{RateCatalog, RateChoice, RateTag};

/// An amount tied to a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<CurrencyCode>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::usd())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.display_decimals();
        let mut v = self
            .amount
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        if self.currency.is_crypto() {
            v = v.normalize();
            write!(f, "{} {}", v, self.currency)
        } else {
            v.rescale(dp);
            write!(f, "{} {}", self.currency.symbol(), v)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Expense,
    Budget,
    Asset,
    Recurring,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Expense => "expense",
            RecordKind::Budget => "budget",
            RecordKind::Asset => "asset",
            RecordKind::Recurring => "recurring",
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(RecordKind::Expense),
            "budget" => Ok(RecordKind::Budget),
            "asset" => Ok(RecordKind::Asset),
            "recurring" => Ok(RecordKind::Recurring),
            other => Err(format!(
                "unknown record kind '{other}' (use expense|budget|asset|recurring)"
            )),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape expenses, budget lines, assets and recurring templates share.
///
/// `amount_in_usd` is a snapshot taken with the rate effective when the record
/// was written. It only moves when the amount, currency or rate is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyRecord {
    pub amount: Decimal,
    pub currency: CurrencyCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_rate_type: Option<RateTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_in_usd: Option<Decimal>,
}

impl MoneyRecord {
    /// A record with a snapshot computed from an explicit rate.
    pub fn with_rate(
        amount: Decimal,
        currency: CurrencyCode,
        rate: Option<Decimal>,
        rate_type: Option<RateTag>,
    ) -> Self {
        let mut rec = Self {
            amount,
            currency,
            recorded_rate: None,
            recorded_rate_type: None,
            amount_in_usd: None,
        };
        rec.apply_rate(rate, rate_type);
        rec
    }

    /// Builds a record from a picker choice against the current catalog.
    pub fn normalize(
        amount: Decimal,
        currency: CurrencyCode,
        choice: &RateChoice,
        catalog: &RateCatalog,
    ) -> Self {
        let rate = catalog.rate_for_choice(choice);
        Self::with_rate(amount, currency, rate, Some(choice.rate_tag()))
    }

    pub fn money(&self) -> Money {
        Money::new(self.amount, self.currency.clone())
    }

    pub fn is_convertible(&self) -> bool {
        self.amount_in_usd.is_some()
    }

    pub fn edit_amount(&mut self, amount: Decimal) {
        self.amount = amount;
        let (rate, t) = (self.recorded_rate, self.recorded_rate_type.take());
        self.apply_rate(rate, t);
    }

    pub fn edit_rate(&mut self, rate: Option<Decimal>, rate_type: Option<RateTag>) {
        self.apply_rate(rate, rate_type);
    }

    /// Switching currency invalidates the old rate, so a new one must come with it.
    pub fn edit_currency(
        &mut self,
        currency: CurrencyCode,
        rate: Option<Decimal>,
        rate_type: Option<RateTag>,
    ) {
        self.currency = currency;
        self.apply_rate(rate, rate_type);
    }

    /// The stored USD snapshot expressed in `target`. Does not touch the record.
    pub fn redisplay(&self, target: &CurrencyCode, target_rate: Option<Decimal>) -> Option<Money> {
        if &self.currency == target {
            return Some(self.money());
        }
        let usd = self.amount_in_usd?;
        Some(Money::new(from_usd(usd, target, target_rate), target.clone()))
    }

    fn apply_rate(&mut self, rate: Option<Decimal>, rate_type: Option<RateTag>) {
        if self.currency.is_usd() {
            self.recorded_rate = Some(Decimal::ONE);
            self.recorded_rate_type = rate_type;
            self.amount_in_usd = Some(self.amount);
            return;
        }
        let rate = rate.filter(|r| *r > Decimal::ZERO);
        self.recorded_rate = rate;
        self.recorded_rate_type = rate_type;
        self.amount_in_usd = if self.amount.is_zero() {
            Some(Decimal::ZERO)
        } else {
            rate.map(|r| to_usd(self.amount, &self.currency, Some(r)))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::rates::{ExchangeRate, RateType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn catalog() -> RateCatalog {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        RateCatalog::new(
            CurrencyCode::new("ARS"),
            vec![
                ExchangeRate::new("ARS", RateType::Official, dec!(1000), day),
                ExchangeRate::new("ARS", RateType::Blue, dec!(1415), day),
            ],
        )
    }

    #[test]
    fn normalize_snapshots_usd() {
        let rec = MoneyRecord::normalize(
            dec!(5000),
            CurrencyCode::new("ARS"),
            &RateChoice::Catalog(RateType::Blue),
            &catalog(),
        );
        assert_eq!(rec.recorded_rate, Some(dec!(1415)));
        assert_eq!(rec.recorded_rate_type, Some(RateTag::Catalog(RateType::Blue)));
        assert_eq!(rec.amount_in_usd, Some(dec!(3.53)));
    }

    #[test]
    fn normalize_custom_and_missing() {
        let rec = MoneyRecord::normalize(
            dec!(2400),
            CurrencyCode::new("ARS"),
            &RateChoice::Custom(dec!(1200)),
            &catalog(),
        );
        assert_eq!(rec.amount_in_usd, Some(dec!(2)));
        assert_eq!(rec.recorded_rate_type, Some(RateTag::Custom));

        let rec = MoneyRecord::normalize(
            dec!(10),
            CurrencyCode::new("ARS"),
            &RateChoice::Catalog(RateType::Named("mep".into())),
            &catalog(),
        );
        assert!(!rec.is_convertible());
    }

    #[test]
    fn snapshot_survives_redisplay() {
        let rec = MoneyRecord::with_rate(
            dec!(1000),
            CurrencyCode::new("ARS"),
            Some(dec!(1000)),
            Some(RateType::Official.into()),
        );
        let shown = rec.redisplay(&CurrencyCode::new("EUR"), Some(dec!(0.5))).unwrap();
        assert_eq!(shown.amount, dec!(0.5));
        assert_eq!(rec.amount_in_usd, Some(dec!(1)));
    }

    #[test]
    fn edits_recompute() {
        let mut rec = MoneyRecord::with_rate(
            dec!(1000),
            CurrencyCode::new("ARS"),
            Some(dec!(1000)),
            Some(RateType::Official.into()),
        );
        rec.edit_amount(dec!(3000));
        assert_eq!(rec.amount_in_usd, Some(dec!(3)));
        assert_eq!(rec.recorded_rate_type, Some(RateType::Official.into()));
        rec.edit_rate(Some(dec!(1500)), Some(RateType::Blue.into()));
        assert_eq!(rec.amount_in_usd, Some(dec!(2)));
        rec.edit_currency(CurrencyCode::new("BTC"), Some(dec!(50000)), None);
        assert_eq!(rec.amount_in_usd, Some(dec!(150000000)));
    }

    #[test]
    fn usd_records_are_their_own_snapshot() {
        let rec = MoneyRecord::with_rate(dec!(12.5), CurrencyCode::usd(), None, None);
        assert_eq!(rec.amount_in_usd, Some(dec!(12.5)));
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::new(dec!(3.5), "EUR").to_string(), "€ 3.50");
        assert_eq!(Money::new(dec!(1234.6), "JPY").to_string(), "¥ 1235");
        assert_eq!(Money::new(dec!(0.50000000), "BTC").to_string(), "0.5 BTC");
    }
}
