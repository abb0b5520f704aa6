// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Once;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::fx::guard::DEFAULT_TOLERANCE;
use crate::fx::{
    CurrencyCode, FavoritesStore, GuardPolicy, InversionGuard, RateCatalog, RateSource,
};
use crate::store::{SqliteFavorites, SqliteRateSource};

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("fxpivot=warn"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    chrono::NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_currency(s: &str) -> Result<CurrencyCode> {
    Ok(CurrencyCode::parse(s)?)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

// Settings

pub const SETTING_KEYS: &[&str] = &[
    "display_currency",
    "user",
    "inversion_tolerance",
    "inversion_policy",
];

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if !SETTING_KEYS.contains(&key) {
        anyhow::bail!("Unknown setting '{}' (known: {})", key, SETTING_KEYS.join(", "));
    }
    // validate before storing so a bad value can't poison later reads
    let mut probe = Settings::default();
    probe.apply(key, value)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub display_currency: CurrencyCode,
    pub user: String,
    pub inversion_tolerance: Decimal,
    pub inversion_policy: GuardPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_currency: CurrencyCode::usd(),
            user: "default".to_string(),
            inversion_tolerance: DEFAULT_TOLERANCE,
            inversion_policy: GuardPolicy::Auto,
        }
    }
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut s = Self::default();
        for key in SETTING_KEYS {
            if let Some(v) = get_setting(conn, key)? {
                s.apply(key, &v)
                    .with_context(|| format!("Invalid stored setting '{}'", key))?;
            }
        }
        Ok(s)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "display_currency" => self.display_currency = parse_currency(value)?,
            "user" => {
                let v = value.trim();
                if v.is_empty() {
                    anyhow::bail!("user must not be empty");
                }
                self.user = v.to_string();
            }
            "inversion_tolerance" => {
                let t = parse_decimal(value)?;
                if t < Decimal::ZERO || t >= Decimal::ONE {
                    anyhow::bail!("inversion_tolerance must be in [0, 1), got {}", t);
                }
                self.inversion_tolerance = t;
            }
            "inversion_policy" => {
                self.inversion_policy = value.parse().map_err(anyhow::Error::msg)?
            }
            other => anyhow::bail!("Unknown setting '{}'", other),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "display_currency" => Some(self.display_currency.to_string()),
            "user" => Some(self.user.clone()),
            "inversion_tolerance" => Some(self.inversion_tolerance.to_string()),
            "inversion_policy" => Some(
                match self.inversion_policy {
                    GuardPolicy::Auto => "auto",
                    GuardPolicy::Confirm => "confirm",
                }
                .to_string(),
            ),
            _ => None,
        }
    }

    pub fn guard(&self) -> InversionGuard {
        InversionGuard::new(self.inversion_tolerance, self.inversion_policy)
    }
}

/// Latest catalog for `currency` with the user's favorites attached.
pub fn load_catalog(
    conn: &Connection,
    user: &str,
    currency: &CurrencyCode,
    as_of: Option<NaiveDate>,
) -> Result<RateCatalog> {
    let favorites: Vec<_> = SqliteFavorites::new(conn)
        .list_favorites(user)?
        .into_iter()
        .filter(|m| &m.currency == currency)
        .map(|m| m.rate_type)
        .collect();
    Ok(SqliteRateSource::new(conn)
        .catalog(currency, as_of)?
        .with_favorites(favorites))
}
