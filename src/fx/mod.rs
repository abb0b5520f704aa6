// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Currency conversion and exchange-rate resolution.
//!
//! USD is the pivot: every amount goes to USD first and only then to its
//! target. Nothing in here does I/O; rate catalogs and favorites come from
//! whoever implements [`RateSource`] and [`FavoritesStore`].

pub mod aggregate;
pub mod convert;
pub mod currency;
pub mod error;
pub mod favorites;
pub mod guard;
pub mod money;
pub mod rates;
pub mod resolver;

use chrono::NaiveDate;

pub use aggregate::{Aggregate, aggregate, aggregate_by};
pub use convert::{DisplayMode, convert, display_rate, from_usd, round_cents, to_usd};
pub use currency::{CurrencyCode, CurrencyKind, QuotationConvention};
pub use error::{FxError, FxResult};
pub use favorites::{FavoriteMark, FavoritesStore, FavoritesView, ReorderState};
pub use guard::{CustomRate, GuardOutcome, GuardPolicy, InversionGuard, accept_custom_rate};
pub use money::{Money, MoneyRecord, RecordKind};
pub use rates::{ExchangeRate, RateCatalog, RateChoice, RateTag, RateType, parse_custom_rate};
pub use resolver::{RateOption, Resolution, resolve_rate};

/// Where catalog snapshots come from.
pub trait RateSource {
    /// Rates for `currency` effective on or before `as_of` (latest when `None`),
    /// at most one per rate type, in the source's preferred order.
    fn rates_for_currency(
        &self,
        currency: &CurrencyCode,
        as_of: Option<NaiveDate>,
    ) -> anyhow::Result<Vec<ExchangeRate>>;

    fn catalog(&self, currency: &CurrencyCode, as_of: Option<NaiveDate>) -> anyhow::Result<RateCatalog> {
        Ok(RateCatalog::new(
            currency.clone(),
            self.rates_for_currency(currency, as_of)?,
        ))
    }
}
