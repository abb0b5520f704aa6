// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Property tests for the USD pivot.

use fxpivot::fx::{CurrencyCode, MoneyRecord, aggregate, convert, from_usd, to_usd};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// 0.01 to 1,000,000.00
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// 0.0001 to 10,000.0000
fn rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn fiat() -> impl Strategy<Value = CurrencyCode> {
    prop::sample::select(vec!["ARS", "EUR", "BRL", "JPY", "GBP"]).prop_map(CurrencyCode::new)
}

fn any_code() -> impl Strategy<Value = CurrencyCode> {
    prop::sample::select(vec!["ARS", "EUR", "BTC", "ETH", "USD", "USDT"]).prop_map(CurrencyCode::new)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn same_currency_is_identity(a in amount(), ccy in any_code(), r1 in rate(), r2 in rate()) {
        prop_assert_eq!(convert(a, &ccy, Some(r1), &ccy, Some(r2)), a);
        prop_assert_eq!(convert(a, &ccy, None, &ccy, None), a);
    }

    #[test]
    fn results_are_cents(a in amount(), ccy in any_code(), r in rate()) {
        let usd = to_usd(a, &ccy, Some(r));
        prop_assert_eq!(usd, usd.round_dp(2));
        let back = from_usd(a, &ccy, Some(r));
        prop_assert_eq!(back, back.round_dp(2));
    }

    #[test]
    fn cross_conversion_goes_through_usd(
        a in amount(),
        src in any_code(),
        tgt in any_code(),
        rs in rate(),
        rt in rate(),
    ) {
        prop_assume!(src != tgt);
        let usd = to_usd(a, &src, Some(rs));
        let expected = if tgt.is_usd() { usd } else { from_usd(usd, &tgt, Some(rt)) };
        prop_assert_eq!(convert(a, &src, Some(rs), &tgt, Some(rt)), expected);
    }

    #[test]
    fn missing_or_zero_rate_yields_zero(a in amount(), ccy in fiat()) {
        prop_assert_eq!(to_usd(a, &ccy, None), Decimal::ZERO);
        prop_assert_eq!(to_usd(a, &ccy, Some(Decimal::ZERO)), Decimal::ZERO);
        prop_assert_eq!(from_usd(a, &ccy, Some(Decimal::NEGATIVE_ONE)), Decimal::ZERO);
    }

    #[test]
    fn sign_is_symmetric(a in amount(), ccy in any_code(), r in rate()) {
        prop_assert_eq!(to_usd(-a, &ccy, Some(r)), -to_usd(a, &ccy, Some(r)));
    }

    #[test]
    fn fiat_round_trip_stays_within_a_cent_of_usd(a in amount(), ccy in fiat(), r in rate()) {
        let back = from_usd(to_usd(a, &ccy, Some(r)), &ccy, Some(r));
        // half a cent of USD is r/200 units, plus the final rounding
        let bound = r / Decimal::from(200) + Decimal::new(1, 2);
        prop_assert!((back - a).abs() <= bound, "{} came back as {}", a, back);
    }

    #[test]
    fn totals_ignore_record_order(
        entries in prop::collection::vec((amount(), any_code(), rate()), 1..20),
        display_rate in rate(),
    ) {
        let records: Vec<MoneyRecord> = entries
            .into_iter()
            .map(|(a, ccy, r)| MoneyRecord::with_rate(a, ccy, Some(r), None))
            .collect();
        let mut reversed = records.clone();
        reversed.reverse();
        let eur = CurrencyCode::new("EUR");
        let forward = aggregate(&records, &eur, |_| Some(display_rate));
        let backward = aggregate(&reversed, &eur, |_| Some(display_rate));
        prop_assert_eq!(forward, backward);
    }
}
