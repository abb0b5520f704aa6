// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fxpivot::fx::{
    CurrencyCode, ExchangeRate, FavoritesView, RateChoice, RateSource, RateType, resolve_rate, to_usd,
};
use fxpivot::store::{SqliteFavorites, SqliteRateSource, add_rate, list_rates};
use fxpivot::{db, utils};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    for (t, rate, day) in [
        (RateType::Official, dec!(1000), "2025-05-01"),
        (RateType::Blue, dec!(1400), "2025-05-01"),
        (RateType::Blue, dec!(1415), "2025-05-10"),
    ] {
        add_rate(&conn, &ExchangeRate::new("ARS", t, rate, d(day))).unwrap();
    }
    conn
}

fn ars() -> CurrencyCode {
    CurrencyCode::new("ARS")
}

#[test]
fn catalog_keeps_latest_rate_per_type() {
    let conn = setup();
    let catalog = SqliteRateSource::new(&conn).catalog(&ars(), None).unwrap();
    let types: Vec<_> = catalog.rates().iter().map(|r| r.rate_type.clone()).collect();
    assert_eq!(types, vec![RateType::Official, RateType::Blue]);
    assert_eq!(catalog.rate_for(&RateType::Blue), Some(dec!(1415)));
    assert_eq!(catalog.rate_for(&RateType::Official), Some(dec!(1000)));
}

#[test]
fn catalog_honours_as_of_cutoff() {
    let conn = setup();
    let source = SqliteRateSource::new(&conn);
    let mid = source.catalog(&ars(), Some(d("2025-05-05"))).unwrap();
    assert_eq!(mid.rate_for(&RateType::Blue), Some(dec!(1400)));

    let before = source.catalog(&ars(), Some(d("2025-04-30"))).unwrap();
    assert!(before.is_empty());
    assert!(!resolve_rate(&ars(), &before, false).is_convertible());
}

#[test]
fn same_day_rate_is_overwritten() {
    let conn = setup();
    add_rate(
        &conn,
        &ExchangeRate::new("ARS", RateType::Blue, dec!(1420), d("2025-05-10")),
    )
    .unwrap();
    let rows = list_rates(&conn, Some(&ars())).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].rate, "1420");
}

#[test]
fn official_is_default_and_favorites_only_reorder() {
    let conn = setup();
    let store = SqliteFavorites::new(&conn);
    let mut view = FavoritesView::load(&store, "default").unwrap();
    view.toggle_with(&store, &ars(), &RateType::Blue).unwrap();

    let catalog = utils::load_catalog(&conn, "default", &ars(), None).unwrap();
    assert_eq!(catalog.favorites(), &[RateType::Blue]);

    let res = resolve_rate(&ars(), &catalog, true);
    assert_eq!(res.options[0].choice, RateChoice::Catalog(RateType::Blue));
    assert!(res.options[0].favorite);
    assert_eq!(res.selected_rate(), Some(dec!(1000)));
    assert!(res.options.last().unwrap().is_custom());
}

#[test]
fn unknown_currency_resolves_to_nothing() {
    let conn = setup();
    let jpy = CurrencyCode::new("JPY");
    let catalog = utils::load_catalog(&conn, "default", &jpy, None).unwrap();
    let res = resolve_rate(&jpy, &catalog, true);
    assert!(res.selected.is_none());
    assert_eq!(res.options.len(), 1);
    assert_eq!(to_usd(dec!(1000), &jpy, res.selected_rate()), Decimal::ZERO);
}

#[test]
fn blue_rate_converts_pesos() {
    let conn = setup();
    let catalog = utils::load_catalog(&conn, "default", &ars(), None).unwrap();
    let blue = catalog.rate_for(&RateType::Blue);
    assert_eq!(to_usd(dec!(5000), &ars(), blue), dec!(3.53));
}

#[test]
fn crypto_rates_are_usd_per_unit() {
    let conn = setup();
    add_rate(
        &conn,
        &ExchangeRate::new("BTC", RateType::Official, dec!(50000), d("2025-05-01")),
    )
    .unwrap();
    let btc = CurrencyCode::new("BTC");
    let catalog = SqliteRateSource::new(&conn).catalog(&btc, None).unwrap();
    let res = resolve_rate(&btc, &catalog, false);
    assert_eq!(to_usd(dec!(0.001), &btc, res.selected_rate()), dec!(50.00));
}
