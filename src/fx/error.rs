// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors surfaced by the rate engine.
///
/// Conversion arithmetic never returns these; a missing rate converts to zero.
/// They exist for lookups that callers want to report and for the favorites
/// persistence path, which must tell the caller it rolled back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FxError {
    #[error("no usable {rate_type} rate for {currency}")]
    NoRateAvailable { currency: String, rate_type: String },

    #[error("invalid custom rate '{0}': expected a positive number")]
    InvalidCustomInput(String),

    #[error("favorites persistence failed: {0}")]
    PersistenceFailure(String),

    #[error("invalid favorites order: {0}")]
    InvalidReorder(String),

    #[error("unknown rate type '{0}'")]
    UnknownRateType(String),

    #[error("invalid currency code '{0}'")]
    InvalidCurrency(String),
}

pub type FxResult<T> = Result<T, FxError>;
