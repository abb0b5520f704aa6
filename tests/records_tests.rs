// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fxpivot::commands::{doctor, records};
use fxpivot::db;
use fxpivot::fx::{CurrencyCode, ExchangeRate, MoneyRecord, RateTag, RateType, RecordKind};
use fxpivot::store::{RecordFilter, add_rate, get_record, insert_record, list_records, update_record};
use fxpivot::utils::Settings;
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    add_rate(
        &conn,
        &ExchangeRate::new("EUR", RateType::Official, dec!(0.92), d("2025-06-01")),
    )
    .unwrap();
    add_rate(
        &conn,
        &ExchangeRate::new("ARS", RateType::Blue, dec!(1415), d("2025-06-01")),
    )
    .unwrap();
    conn
}

fn rec(amount: Decimal, ccy: &str, rate: Option<Decimal>, t: &str) -> MoneyRecord {
    MoneyRecord::with_rate(amount, CurrencyCode::new(ccy), rate, Some(t.parse().unwrap()))
}

fn seed(conn: &Connection) {
    insert_record(conn, RecordKind::Expense, d("2025-06-02"), &rec(dec!(5000), "ARS", Some(dec!(1415)), "blue"), Some("groceries")).unwrap();
    insert_record(conn, RecordKind::Expense, d("2025-07-01"), &rec(dec!(10), "USD", None, "official"), None).unwrap();
    insert_record(conn, RecordKind::Asset, d("2025-07-03"), &rec(dec!(0.001), "BTC", Some(dec!(50000)), "official"), None).unwrap();
}

#[test]
fn records_keep_their_usd_snapshot() {
    let conn = setup();
    seed(&conn);
    let all = list_records(&conn, &RecordFilter::default()).unwrap();
    assert_eq!(all.len(), 3);
    // newest first
    assert_eq!(all[0].record.currency, CurrencyCode::new("BTC"));
    assert_eq!(all[0].record.amount_in_usd, Some(dec!(50.00)));
    assert_eq!(all[2].record.amount_in_usd, Some(dec!(3.53)));
    assert_eq!(all[2].record.recorded_rate_type, Some(RateTag::Catalog(RateType::Blue)));
    assert_eq!(all[2].note.as_deref(), Some("groceries"));

    let july = list_records(
        &conn,
        &RecordFilter {
            month: Some("2025-07".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(july.len(), 2);
    let assets = list_records(
        &conn,
        &RecordFilter {
            kind: Some(RecordKind::Asset),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(assets.len(), 1);
}

#[test]
fn editing_amount_recomputes_snapshot_with_recorded_rate() {
    let conn = setup();
    seed(&conn);
    let id = list_records(&conn, &RecordFilter::default()).unwrap()[2].id;
    let mut stored = get_record(&conn, id).unwrap();
    stored.record.edit_amount(dec!(10000));
    update_record(&conn, id, &stored.record).unwrap();

    let again = get_record(&conn, id).unwrap();
    assert_eq!(again.record.amount_in_usd, Some(dec!(7.07)));
    assert_eq!(again.record.recorded_rate, Some(dec!(1415)));
    assert_eq!(again.record.recorded_rate_type, Some(RateTag::Catalog(RateType::Blue)));
}

#[test]
fn missing_record_is_an_error() {
    let conn = setup();
    seed(&conn);
    let err = get_record(&conn, 999).unwrap_err();
    assert_eq!(err.to_string(), "Record 999 not found");
    let first = list_records(&conn, &RecordFilter::default()).unwrap()[0].id;
    assert_eq!(get_record(&conn, first).unwrap().id, first);
}

#[test]
fn custom_tag_survives_storage() {
    let conn = setup();
    let id = insert_record(&conn, RecordKind::Expense, d("2025-06-05"), &rec(dec!(2400), "ARS", Some(dec!(1200)), "custom"), None).unwrap();
    let back = get_record(&conn, id).unwrap();
    assert_eq!(back.record.recorded_rate_type, Some(RateTag::Custom));
    assert_eq!(back.record.amount_in_usd, Some(dec!(2)));
}

#[test]
fn editing_currency_takes_the_new_rate() {
    let conn = setup();
    seed(&conn);
    let id = list_records(&conn, &RecordFilter::default()).unwrap()[2].id;
    let mut stored = get_record(&conn, id).unwrap();
    stored
        .record
        .edit_currency(CurrencyCode::new("EUR"), Some(dec!(0.92)), Some(RateType::Official.into()));
    update_record(&conn, id, &stored.record).unwrap();
    // 5000 / 0.92 = 5434.78
    assert_eq!(get_record(&conn, id).unwrap().record.amount_in_usd, Some(dec!(5434.78)));
}

#[test]
fn totals_sum_usd_then_convert_once() {
    let conn = setup();
    seed(&conn);
    let settings = Settings::default();
    let stored = list_records(&conn, &RecordFilter::default()).unwrap();

    let eur = CurrencyCode::new("EUR");
    let rows = records::totals(&conn, &settings, &stored, &eur, None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].usd_total, "63.53");
    assert_eq!(rows[0].currency, "EUR");
    assert_eq!(rows[0].included, 3);
    assert_eq!(rows[0].skipped, 0);

    let usd = records::totals(&conn, &settings, &stored, &CurrencyCode::usd(), None).unwrap();
    assert_eq!(usd[0].usd_total, "63.53");
}

#[test]
fn totals_group_by_month_and_kind() {
    let conn = setup();
    seed(&conn);
    let settings = Settings::default();
    let stored = list_records(&conn, &RecordFilter::default()).unwrap();
    let usd = CurrencyCode::usd();

    let by_month = records::totals(&conn, &settings, &stored, &usd, Some("month")).unwrap();
    let groups: Vec<(&str, &str)> = by_month
        .iter()
        .map(|r| (r.group.as_str(), r.usd_total.as_str()))
        .collect();
    assert_eq!(groups, vec![("2025-06", "3.53"), ("2025-07", "60.00")]);

    let by_kind = records::totals(&conn, &settings, &stored, &usd, Some("kind")).unwrap();
    let groups: Vec<(&str, &str)> = by_kind
        .iter()
        .map(|r| (r.group.as_str(), r.usd_total.as_str()))
        .collect();
    assert_eq!(groups, vec![("expense", "13.53"), ("asset", "50.00")]);
}

#[test]
fn unconvertible_records_are_skipped_and_reported() {
    let conn = setup();
    seed(&conn);
    insert_record(&conn, RecordKind::Budget, d("2025-07-04"), &rec(dec!(2000), "JPY", None, "official"), None).unwrap();

    let stored = list_records(&conn, &RecordFilter::default()).unwrap();
    let rows = records::totals(&conn, &Settings::default(), &stored, &CurrencyCode::usd(), None).unwrap();
    assert_eq!(rows[0].usd_total, "63.53");
    assert_eq!(rows[0].skipped, 1);

    let issues: Vec<String> = doctor::diagnose(&conn)
        .unwrap()
        .into_iter()
        .map(|i| i.issue)
        .collect();
    assert!(issues.contains(&"no_rate".to_string()));
    assert!(issues.contains(&"unconvertible_record".to_string()));
}

#[test]
fn doctor_flags_custom_rate_typed_backwards() {
    let conn = setup();
    // 1415 typed as USD per peso, i.e. the catalog number in the wrong field
    let system = Decimal::ONE / dec!(1415);
    insert_record(&conn, RecordKind::Expense, d("2025-06-03"), &rec(dec!(5000), "ARS", Some(system), "custom"), None).unwrap();
    insert_record(&conn, RecordKind::Expense, d("2025-06-04"), &rec(dec!(5000), "ARS", Some(dec!(1500)), "custom"), None).unwrap();

    let issues = doctor::diagnose(&conn).unwrap();
    let flagged: Vec<_> = issues.iter().filter(|i| i.issue == "custom_rate_inverted").collect();
    assert_eq!(flagged.len(), 1);
    assert!(flagged[0].detail.starts_with("#1 "));
}

#[test]
fn clean_database_has_no_issues() {
    let conn = setup();
    seed(&conn);
    assert!(doctor::diagnose(&conn).unwrap().is_empty());
}
