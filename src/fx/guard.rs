// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Detection of custom fiat rates typed in the wrong convention.
//!
//! People type "how much is 1 unit worth" (USD per unit), while fiat rates are
//! stored as units per USD. A custom value within the tolerance band of the raw
//! catalog rate of the same type was almost certainly pasted from the catalog
//! in system convention, so it is replaced by its reciprocal.
//!
//! This is a heuristic. A deliberately close manual rate is a false positive,
//! and an inverted value that drifted outside the band is a false negative.
//! `GuardPolicy::Confirm` reports instead of rewriting.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::convert::system_rate_from_display;
use super::currency::CurrencyCode;
use super::rates::{RateCatalog, RateType};

/// 1%, i.e. a ratio within `[0.99, 1.01]`.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardPolicy {
    /// Replace the value with its reciprocal.
    #[default]
    Auto,
    /// Only report the suspicion.
    Confirm,
}

impl FromStr for GuardPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(GuardPolicy::Auto),
            "confirm" => Ok(GuardPolicy::Confirm),
            other => Err(format!("unknown inversion policy '{other}' (use auto|confirm)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuardOutcome {
    /// Nothing to compare against, or not a fiat currency.
    Skipped,
    Unchanged { rate: Decimal },
    Suspected { rate: Decimal, suggested: Decimal },
    Corrected { original: Decimal, corrected: Decimal },
}

impl GuardOutcome {
    /// The rate the caller should keep using, given the value it passed in.
    pub fn effective(&self, input: Decimal) -> Decimal {
        match self {
            GuardOutcome::Corrected { corrected, .. } => *corrected,
            _ => input,
        }
    }
}

/// Returns the reciprocal of `custom` when it sits inside the band around `reference`.
pub fn detect_inversion(custom: Decimal, reference: Decimal, tolerance: Decimal) -> Option<Decimal> {
    if custom <= Decimal::ZERO || reference <= Decimal::ZERO {
        return None;
    }
    let ratio = custom.checked_div(reference)?;
    let lo = Decimal::ONE - tolerance;
    let hi = Decimal::ONE + tolerance;
    if ratio >= lo && ratio <= hi {
        Decimal::ONE.checked_div(custom)
    } else {
        None
    }
}

/// Stateful wrapper that checks each distinct `(rate, type)` once.
///
/// A repeat of the last pair gets the outcome of the first check back, so a
/// correction already applied is never undone by checking it again.
#[derive(Debug, Clone, Default)]
pub struct InversionGuard {
    tolerance: Option<Decimal>,
    policy: GuardPolicy,
    last: Option<(CurrencyCode, Decimal, RateType, GuardOutcome)>,
}

impl InversionGuard {
    pub fn new(tolerance: Decimal, policy: GuardPolicy) -> Self {
        Self {
            tolerance: Some(tolerance),
            policy,
            last: None,
        }
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance.unwrap_or(DEFAULT_TOLERANCE)
    }

    pub fn policy(&self) -> GuardPolicy {
        self.policy
    }

    pub fn check(
        &mut self,
        currency: &CurrencyCode,
        custom: Decimal,
        declared: &RateType,
        catalog: &RateCatalog,
    ) -> GuardOutcome {
        if let Some((ccy, rate, t, outcome)) = &self.last {
            if ccy == currency && *rate == custom && t == declared {
                return outcome.clone();
            }
        }
        let outcome = self.evaluate(currency, custom, declared, catalog);
        self.last = Some((currency.clone(), custom, declared.clone(), outcome.clone()));
        outcome
    }

    /// Runs the heuristic without touching the once-per-pair memory.
    pub fn evaluate(
        &self,
        currency: &CurrencyCode,
        custom: Decimal,
        declared: &RateType,
        catalog: &RateCatalog,
    ) -> GuardOutcome {
        if currency.is_crypto() || currency.is_usd() || &catalog.currency != currency {
            return GuardOutcome::Skipped;
        }
        let Some(reference) = catalog.rate_for(declared) else {
            return GuardOutcome::Skipped;
        };
        match detect_inversion(custom, reference, self.tolerance()) {
            None => GuardOutcome::Unchanged { rate: custom },
            Some(flipped) => match self.policy {
                GuardPolicy::Auto => {
                    tracing::warn!(
                        %currency,
                        rate_type = %declared,
                        original = %custom,
                        corrected = %flipped,
                        "custom rate matches catalog rate in system convention, inverting"
                    );
                    GuardOutcome::Corrected {
                        original: custom,
                        corrected: flipped,
                    }
                }
                GuardPolicy::Confirm => {
                    tracing::info!(%currency, rate_type = %declared, %custom, "custom rate looks inverted");
                    GuardOutcome::Suspected {
                        rate: custom,
                        suggested: flipped,
                    }
                }
            },
        }
    }
}

/// A custom rate after the guard has looked at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomRate {
    /// USD per unit, as the user meant it.
    pub display: Decimal,
    /// In the currency's stored convention, ready for conversion.
    pub system: Decimal,
    pub outcome: GuardOutcome,
}

/// Takes a human-entered custom rate (USD per unit) through the guard and into
/// the stored convention. `declared` is the catalog type the user says it mirrors.
pub fn accept_custom_rate(
    guard: &mut InversionGuard,
    currency: &CurrencyCode,
    entered: Decimal,
    declared: Option<&RateType>,
    catalog: &RateCatalog,
) -> Option<CustomRate> {
    if entered <= Decimal::ZERO {
        return None;
    }
    let outcome = match declared {
        Some(t) => guard.check(currency, entered, t, catalog),
        None => GuardOutcome::Skipped,
    };
    let (display, system) = match &outcome {
        // the value was already in stored convention
        GuardOutcome::Corrected {
            original,
            corrected,
        } => (*corrected, *original),
        _ => (entered, system_rate_from_display(entered, currency)?),
    };
    Some(CustomRate {
        display,
        system,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::rates::ExchangeRate;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn ars_catalog() -> RateCatalog {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        RateCatalog::new(
            CurrencyCode::new("ARS"),
            vec![
                ExchangeRate::new("ARS", RateType::Official, dec!(1000), day),
                ExchangeRate::new("ARS", RateType::Blue, dec!(1415), day),
            ],
        )
    }

    #[test]
    fn band_edges() {
        assert_eq!(detect_inversion(dec!(990), dec!(1000), DEFAULT_TOLERANCE), Some(Decimal::ONE / dec!(990)));
        assert_eq!(detect_inversion(dec!(1010), dec!(1000), DEFAULT_TOLERANCE), Some(Decimal::ONE / dec!(1010)));
        assert_eq!(detect_inversion(dec!(989), dec!(1000), DEFAULT_TOLERANCE), None);
        assert_eq!(detect_inversion(dec!(1011), dec!(1000), DEFAULT_TOLERANCE), None);
        assert_eq!(detect_inversion(dec!(0), dec!(1000), DEFAULT_TOLERANCE), None);
    }

    #[test]
    fn corrects_raw_catalog_value() {
        let mut g = InversionGuard::default();
        let ars = CurrencyCode::new("ARS");
        let out = g.check(&ars, dec!(1415), &RateType::Blue, &ars_catalog());
        assert_eq!(
            out,
            GuardOutcome::Corrected {
                original: dec!(1415),
                corrected: Decimal::ONE / dec!(1415)
            }
        );
        assert_eq!(out.effective(dec!(1415)), Decimal::ONE / dec!(1415));
    }

    #[test]
    fn reciprocal_input_is_left_alone() {
        let g = InversionGuard::default();
        let ars = CurrencyCode::new("ARS");
        let out = g.evaluate(&ars, dec!(0.0007), &RateType::Blue, &ars_catalog());
        assert_eq!(out, GuardOutcome::Unchanged { rate: dec!(0.0007) });
    }

    #[test]
    fn runs_once_per_pair() {
        let mut g = InversionGuard::default();
        let ars = CurrencyCode::new("ARS");
        let cat = ars_catalog();
        let first = g.check(&ars, dec!(1000), &RateType::Official, &cat);
        assert!(matches!(first, GuardOutcome::Corrected { .. }));
        // a later catalog would no longer match, the first verdict stands
        let moved = RateCatalog::new(
            ars.clone(),
            vec![ExchangeRate::new(
                "ARS",
                RateType::Official,
                dec!(1200),
                NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            )],
        );
        assert_eq!(g.check(&ars, dec!(1000), &RateType::Official, &moved), first);
        assert!(matches!(
            g.check(&ars, dec!(1000), &RateType::Blue, &cat),
            GuardOutcome::Unchanged { .. }
        ));
    }

    #[test]
    fn skips_crypto_and_unknown_types() {
        let g = InversionGuard::default();
        let btc = CurrencyCode::new("BTC");
        let btc_cat = RateCatalog::new(
            btc.clone(),
            vec![ExchangeRate::new(
                "BTC",
                RateType::Official,
                dec!(50000),
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            )],
        );
        assert_eq!(
            g.evaluate(&btc, dec!(50000), &RateType::Official, &btc_cat),
            GuardOutcome::Skipped
        );
        let ars = CurrencyCode::new("ARS");
        assert_eq!(
            g.evaluate(&ars, dec!(1380), &RateType::Named("mep".into()), &ars_catalog()),
            GuardOutcome::Skipped
        );
    }

    #[test]
    fn confirm_policy_reports_only() {
        let g = InversionGuard::new(DEFAULT_TOLERANCE, GuardPolicy::Confirm);
        let ars = CurrencyCode::new("ARS");
        let out = g.evaluate(&ars, dec!(1001), &RateType::Official, &ars_catalog());
        assert!(matches!(out, GuardOutcome::Suspected { .. }));
        assert_eq!(out.effective(dec!(1001)), dec!(1001));
    }

    #[test]
    fn pasted_catalog_value_converts_like_the_catalog() {
        let mut g = InversionGuard::default();
        let ars = CurrencyCode::new("ARS");
        let cat = ars_catalog();
        let c = accept_custom_rate(&mut g, &ars, dec!(1415), Some(&RateType::Blue), &cat).unwrap();
        assert_eq!(c.system, dec!(1415));
        assert_eq!(
            crate::fx::convert::to_usd(dec!(5000), &ars, Some(c.system)),
            dec!(3.53)
        );
    }

    #[test]
    fn repeated_custom_rate_keeps_its_correction() {
        let mut g = InversionGuard::default();
        let ars = CurrencyCode::new("ARS");
        let cat = ars_catalog();
        let first = accept_custom_rate(&mut g, &ars, dec!(1415), Some(&RateType::Blue), &cat).unwrap();
        let second = accept_custom_rate(&mut g, &ars, dec!(1415), Some(&RateType::Blue), &cat).unwrap();
        assert_eq!(second, first);
        assert_eq!(second.system, dec!(1415));
        assert_eq!(
            crate::fx::convert::to_usd(dec!(5000), &ars, Some(second.system)),
            dec!(3.53)
        );
    }

    #[test]
    fn human_value_is_flipped_into_system_convention() {
        let mut g = InversionGuard::default();
        let ars = CurrencyCode::new("ARS");
        let c = accept_custom_rate(&mut g, &ars, dec!(0.001), Some(&RateType::Official), &ars_catalog())
            .unwrap();
        assert!(matches!(c.outcome, GuardOutcome::Unchanged { .. }));
        assert_eq!(c.system, dec!(1000));
        assert!(accept_custom_rate(&mut g, &ars, dec!(0), None, &ars_catalog()).is_none());
    }
}
