// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed collaborators: rate catalog, favorites and record storage.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::fx::{
    CurrencyCode, ExchangeRate, FavoriteMark, FavoritesStore, FxError, FxResult, MoneyRecord,
    RateSource, RateTag, RateType, RecordKind,
};
use crate::models::{RateRow, StoredRecord};

const FAR_FUTURE: &str = "9999-12-31";

fn parse_dec(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}' in database", what, s))
}

pub struct SqliteRateSource<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRateSource<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl RateSource for SqliteRateSource<'_> {
    fn rates_for_currency(
        &self,
        currency: &CurrencyCode,
        as_of: Option<NaiveDate>,
    ) -> Result<Vec<ExchangeRate>> {
        let cutoff = as_of
            .map(|d| d.to_string())
            .unwrap_or_else(|| FAR_FUTURE.to_string());
        // latest row per type on or before the cutoff, types in first-seen order
        let mut stmt = self.conn.prepare(
            "SELECT e.rate_type, e.rate, e.as_of FROM exchange_rates e
             WHERE e.currency=?1 AND e.as_of = (
                SELECT MAX(x.as_of) FROM exchange_rates x
                WHERE x.currency=e.currency AND x.rate_type=e.rate_type AND x.as_of<=?2)
             ORDER BY (SELECT MIN(y.id) FROM exchange_rates y
                       WHERE y.currency=e.currency AND y.rate_type=e.rate_type)",
        )?;
        let rows = stmt.query_map(params![currency.as_str(), cutoff], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (t, rate_s, d) = row?;
            let rate_type: RateType = t
                .parse()
                .with_context(|| format!("Invalid rate type '{}' for {}", t, currency))?;
            let rate = parse_dec(&rate_s, "rate")?;
            let as_of = crate::utils::parse_date(&d)?;
            out.push(ExchangeRate::new(currency.clone(), rate_type, rate, as_of));
        }
        Ok(out)
    }
}

pub fn add_rate(conn: &Connection, rate: &ExchangeRate) -> Result<()> {
    conn.execute(
        "INSERT INTO exchange_rates(currency, rate_type, rate, as_of) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(currency, rate_type, as_of) DO UPDATE SET rate=excluded.rate",
        params![
            rate.currency.as_str(),
            rate.rate_type.as_str(),
            rate.rate.to_string(),
            rate.as_of.to_string()
        ],
    )?;
    Ok(())
}

pub fn list_rates(conn: &Connection, currency: Option<&CurrencyCode>) -> Result<Vec<RateRow>> {
    let mut stmt = conn.prepare(
        "SELECT currency, rate_type, rate, as_of FROM exchange_rates
         WHERE ?1 IS NULL OR currency=?1
         ORDER BY as_of DESC, currency, rate_type LIMIT 100",
    )?;
    let rows = stmt.query_map(params![currency.map(|c| c.as_str())], |r| {
        Ok(RateRow {
            currency: r.get(0)?,
            rate_type: r.get(1)?,
            rate: r.get(2)?,
            as_of: r.get(3)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub struct SqliteFavorites<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteFavorites<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn load(&self, user: &str) -> Result<Vec<FavoriteMark>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, currency, rate_type, position FROM favorites WHERE user=?1 ORDER BY position, id",
        )?;
        let rows = stmt.query_map(params![user], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, i64>(3)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (id, ccy, t, pos) = row?;
            out.push(FavoriteMark {
                id,
                currency: CurrencyCode::new(ccy),
                rate_type: t.parse()?,
                position: usize::try_from(pos).unwrap_or_default(),
            });
        }
        Ok(out)
    }

    fn write_order(&self, user: &str, ordered_ids: &[i64]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (pos, id) in ordered_ids.iter().enumerate() {
            let n = tx.execute(
                "UPDATE favorites SET position=?1 WHERE id=?2 AND user=?3",
                params![pos as i64, id, user],
            )?;
            if n == 0 {
                anyhow::bail!("favorite {} does not belong to {}", id, user);
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn flip(&self, user: &str, currency: &CurrencyCode, rate_type: &RateType) -> Result<Option<FavoriteMark>> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM favorites WHERE user=?1 AND currency=?2 AND rate_type=?3",
                params![user, currency.as_str(), rate_type.as_str()],
                |r| r.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            self.conn
                .execute("DELETE FROM favorites WHERE id=?1", params![id])?;
            return Ok(None);
        }
        let next: i64 = self.conn.query_row(
            "SELECT IFNULL(MAX(position) + 1, 0) FROM favorites WHERE user=?1",
            params![user],
            |r| r.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO favorites(user, currency, rate_type, position) VALUES (?1, ?2, ?3, ?4)",
            params![user, currency.as_str(), rate_type.as_str(), next],
        )?;
        Ok(Some(FavoriteMark {
            id: self.conn.last_insert_rowid(),
            currency: currency.clone(),
            rate_type: rate_type.clone(),
            position: usize::try_from(next).unwrap_or_default(),
        }))
    }
}

fn persistence(e: anyhow::Error) -> FxError {
    FxError::PersistenceFailure(format!("{:#}", e))
}

impl FavoritesStore for SqliteFavorites<'_> {
    fn list_favorites(&self, user: &str) -> FxResult<Vec<FavoriteMark>> {
        self.load(user).map_err(persistence)
    }

    fn reorder(&self, user: &str, ordered_ids: &[i64]) -> FxResult<()> {
        self.write_order(user, ordered_ids).map_err(persistence)
    }

    fn toggle_favorite(
        &self,
        user: &str,
        currency: &CurrencyCode,
        rate_type: &RateType,
    ) -> FxResult<Option<FavoriteMark>> {
        self.flip(user, currency, rate_type).map_err(persistence)
    }
}

pub fn insert_record(
    conn: &Connection,
    kind: RecordKind,
    date: NaiveDate,
    rec: &MoneyRecord,
    note: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO records(kind, date, amount, currency, recorded_rate, recorded_rate_type, amount_in_usd, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            kind.as_str(),
            date.to_string(),
            rec.amount.to_string(),
            rec.currency.as_str(),
            rec.recorded_rate.map(|d| d.to_string()),
            rec.recorded_rate_type.as_ref().map(|t| t.as_str()),
            rec.amount_in_usd.map(|d| d.to_string()),
            note
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_record(conn: &Connection, id: i64, rec: &MoneyRecord) -> Result<()> {
    let n = conn.execute(
        "UPDATE records SET amount=?1, currency=?2, recorded_rate=?3, recorded_rate_type=?4, amount_in_usd=?5
         WHERE id=?6",
        params![
            rec.amount.to_string(),
            rec.currency.as_str(),
            rec.recorded_rate.map(|d| d.to_string()),
            rec.recorded_rate_type.as_ref().map(|t| t.as_str()),
            rec.amount_in_usd.map(|d| d.to_string()),
            id
        ],
    )?;
    if n == 0 {
        anyhow::bail!("Record {} not found", id);
    }
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    pub kind: Option<RecordKind>,
    pub month: Option<String>,
    pub limit: Option<usize>,
}

const RECORD_COLUMNS: &str =
    "SELECT id, kind, date, amount, currency, recorded_rate, recorded_rate_type, amount_in_usd, note
     FROM records";

pub fn list_records(conn: &Connection, filter: &RecordFilter) -> Result<Vec<StoredRecord>> {
    let mut sql = format!("{} WHERE 1=1", RECORD_COLUMNS);
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind=?");
        params_vec.push(kind.as_str().into());
    }
    if let Some(month) = &filter.month {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.clone());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(read_record(r)?);
    }
    Ok(data)
}

pub fn get_record(conn: &Connection, id: i64) -> Result<StoredRecord> {
    let mut stmt = conn.prepare(&format!("{} WHERE id=?1", RECORD_COLUMNS))?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => read_record(r),
        None => anyhow::bail!("Record {} not found", id),
    }
}

fn read_record(r: &rusqlite::Row<'_>) -> Result<StoredRecord> {
    let id: i64 = r.get(0)?;
    let kind_s: String = r.get(1)?;
    let date_s: String = r.get(2)?;
    let amount_s: String = r.get(3)?;
    let currency: String = r.get(4)?;
    let rate_s: Option<String> = r.get(5)?;
    let rate_type_s: Option<String> = r.get(6)?;
    let usd_s: Option<String> = r.get(7)?;
    let note: Option<String> = r.get(8)?;
    let recorded_rate_type = rate_type_s
        .as_deref()
        .map(|s| {
            s.parse::<RateTag>()
                .with_context(|| format!("Invalid rate type '{}' in database", s))
        })
        .transpose()?;
    Ok(StoredRecord {
        id,
        kind: kind_s.parse::<RecordKind>().map_err(anyhow::Error::msg)?,
        date: crate::utils::parse_date(&date_s)?,
        record: MoneyRecord {
            amount: parse_dec(&amount_s, "amount")?,
            currency: CurrencyCode::new(currency),
            recorded_rate: rate_s.as_deref().map(|s| parse_dec(s, "rate")).transpose()?,
            recorded_rate_type,
            amount_in_usd: usd_s
                .as_deref()
                .map(|s| parse_dec(s, "USD amount"))
                .transpose()?,
        },
        note,
    })
}

pub fn record_currencies(conn: &Connection) -> Result<Vec<CurrencyCode>> {
    let mut stmt = conn.prepare("SELECT DISTINCT currency FROM records ORDER BY currency")?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(CurrencyCode::new(row?));
    }
    Ok(out)
}
