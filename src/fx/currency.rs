// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Currency codes and their quotation conventions.
//!
//! A code is fiat when it appears in the reference table below and crypto
//! otherwise. The kind decides which way a stored rate is read:
//! fiat rates are units per 1 USD, crypto rates are USD per 1 unit.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{FxError, FxResult};

pub const USD: &str = "USD";

/// Reference data for a real-world currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiatInfo {
    pub code: &'static str,
    pub symbols: &'static [&'static str],
    pub decimals: u32,
}

impl FiatInfo {
    pub fn symbol(&self) -> &'static str {
        self.symbols.first().copied().unwrap_or(self.code)
    }
}

macro_rules! fiat {
    ($code:literal, [$($sym:literal),*], $dp:literal) => {
        FiatInfo { code: $code, symbols: &[$($sym),*], decimals: $dp }
    };
}

static FIAT_TABLE: &[FiatInfo] = &[
    fiat!("USD", ["$", "US$"], 2),
    fiat!("EUR", ["€"], 2),
    fiat!("GBP", ["£"], 2),
    fiat!("JPY", ["¥", "円"], 0),
    fiat!("CHF", ["CHF", "Fr."], 2),
    fiat!("CAD", ["C$", "CA$"], 2),
    fiat!("AUD", ["A$", "AU$"], 2),
    fiat!("NZD", ["NZ$"], 2),
    fiat!("CNY", ["¥", "元"], 2),
    fiat!("HKD", ["HK$"], 2),
    fiat!("SGD", ["S$"], 2),
    fiat!("INR", ["₹"], 2),
    fiat!("KRW", ["₩"], 0),
    fiat!("SEK", ["kr"], 2),
    fiat!("NOK", ["kr"], 2),
    fiat!("DKK", ["kr"], 2),
    fiat!("PLN", ["zł"], 2),
    fiat!("CZK", ["Kč"], 2),
    fiat!("HUF", ["Ft"], 2),
    fiat!("TRY", ["₺"], 2),
    fiat!("RUB", ["₽"], 2),
    fiat!("UAH", ["₴"], 2),
    fiat!("ILS", ["₪"], 2),
    fiat!("ZAR", ["R"], 2),
    fiat!("MXN", ["$", "Mex$"], 2),
    fiat!("BRL", ["R$"], 2),
    fiat!("ARS", ["$", "AR$"], 2),
    fiat!("CLP", ["$", "CLP$"], 0),
    fiat!("COP", ["$", "COL$"], 2),
    fiat!("PEN", ["S/"], 2),
    fiat!("UYU", ["$U"], 2),
    fiat!("PYG", ["₲"], 0),
    fiat!("BOB", ["Bs."], 2),
    fiat!("VES", ["Bs.S"], 2),
    fiat!("THB", ["฿"], 2),
    fiat!("IDR", ["Rp"], 2),
    fiat!("MYR", ["RM"], 2),
    fiat!("PHP", ["₱"], 2),
    fiat!("VND", ["₫"], 0),
    fiat!("AED", ["د.إ", "AED"], 2),
    fiat!("SAR", ["﷼", "SAR"], 2),
    fiat!("EGP", ["E£"], 2),
    fiat!("NGN", ["₦"], 2),
    fiat!("KES", ["KSh"], 2),
    fiat!("KWD", ["KD"], 3),
    fiat!("BHD", ["BD"], 3),
];

static FIAT_INDEX: Lazy<HashMap<&'static str, &'static FiatInfo>> =
    Lazy::new(|| FIAT_TABLE.iter().map(|f| (f.code, f)).collect());

static CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z0-9]{2,10}$").unwrap_or_else(|e| panic!("currency code regex: {e}"))
});

/// Which side of the dollar a currency's rate is quoted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotationConvention {
    /// How many units of this currency buy 1 USD (fiat).
    UnitsPerUsd,
    /// How many USD one unit of this currency is worth (crypto).
    UsdPerUnit,
}

impl QuotationConvention {
    /// Expresses `amount` in USD. Caller guarantees `rate > 0`.
    pub fn to_usd(self, amount: Decimal, rate: Decimal) -> Decimal {
        match self {
            QuotationConvention::UsdPerUnit => amount.checked_mul(rate),
            QuotationConvention::UnitsPerUsd => amount.checked_div(rate),
        }
        .unwrap_or(Decimal::ZERO)
    }

    /// Expresses a USD amount in the quoted currency. Caller guarantees `rate > 0`.
    pub fn from_usd(self, usd: Decimal, rate: Decimal) -> Decimal {
        match self {
            QuotationConvention::UsdPerUnit => usd.checked_div(rate),
            QuotationConvention::UnitsPerUsd => usd.checked_mul(rate),
        }
        .unwrap_or(Decimal::ZERO)
    }

    /// Short unit label for a rate in this convention, e.g. `ARS/USD`.
    pub fn unit_label(self, code: &str) -> String {
        match self {
            QuotationConvention::UnitsPerUsd => format!("{code}/{USD}"),
            QuotationConvention::UsdPerUnit => format!("{USD}/{code}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyKind {
    Fiat,
    Crypto,
}

/// An uppercase currency identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Like [`CurrencyCode::new`] but rejects anything that doesn't look like a ticker.
    pub fn parse(code: &str) -> FxResult<Self> {
        let c = Self::new(code);
        if CODE_RE.is_match(&c.0) {
            Ok(c)
        } else {
            Err(FxError::InvalidCurrency(code.to_string()))
        }
    }

    pub fn usd() -> Self {
        Self(USD.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_usd(&self) -> bool {
        self.0 == USD
    }

    pub fn info(&self) -> Option<&'static FiatInfo> {
        FIAT_INDEX.get(self.0.as_str()).copied()
    }

    pub fn kind(&self) -> CurrencyKind {
        if self.info().is_some() {
            CurrencyKind::Fiat
        } else {
            CurrencyKind::Crypto
        }
    }

    pub fn is_crypto(&self) -> bool {
        self.kind() == CurrencyKind::Crypto
    }

    pub fn quotation_convention(&self) -> QuotationConvention {
        match self.kind() {
            CurrencyKind::Fiat => QuotationConvention::UnitsPerUsd,
            CurrencyKind::Crypto => QuotationConvention::UsdPerUnit,
        }
    }

    /// Digits shown when formatting an amount of this currency.
    pub fn display_decimals(&self) -> u32 {
        self.info().map(|f| f.decimals).unwrap_or(8)
    }

    pub fn symbol(&self) -> &str {
        self.info().map(|f| f.symbol()).unwrap_or(self.0.as_str())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::usd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fiat_by_table_crypto_by_exclusion() {
        assert_eq!(CurrencyCode::new("ars").kind(), CurrencyKind::Fiat);
        assert_eq!(CurrencyCode::new("BTC").kind(), CurrencyKind::Crypto);
        assert_eq!(CurrencyCode::new("SOMECOIN").kind(), CurrencyKind::Crypto);
        assert!(CurrencyCode::new(" usd ").is_usd());
    }

    #[test]
    fn convention_follows_kind() {
        assert_eq!(
            CurrencyCode::new("EUR").quotation_convention(),
            QuotationConvention::UnitsPerUsd
        );
        assert_eq!(
            CurrencyCode::new("ETH").quotation_convention(),
            QuotationConvention::UsdPerUnit
        );
    }

    #[test]
    fn convention_arithmetic() {
        let fiat = QuotationConvention::UnitsPerUsd;
        let crypto = QuotationConvention::UsdPerUnit;
        assert_eq!(fiat.to_usd(dec!(830), dec!(83)), dec!(10));
        assert_eq!(fiat.from_usd(dec!(10), dec!(83)), dec!(830));
        assert_eq!(crypto.to_usd(dec!(2), dec!(3000)), dec!(6000));
        assert_eq!(crypto.from_usd(dec!(6000), dec!(3000)), dec!(2));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(CurrencyCode::parse("usdt").is_ok());
        assert!(CurrencyCode::parse("").is_err());
        assert!(CurrencyCode::parse("U S D").is_err());
        assert!(CurrencyCode::parse("$").is_err());
    }

    #[test]
    fn display_digits() {
        assert_eq!(CurrencyCode::new("JPY").display_decimals(), 0);
        assert_eq!(CurrencyCode::new("KWD").display_decimals(), 3);
        assert_eq!(CurrencyCode::new("BTC").display_decimals(), 8);
        assert_eq!(CurrencyCode::new("GBP").symbol(), "£");
    }
}
