// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fx::{MoneyRecord, RecordKind};

/// A money record as persisted, with its bookkeeping columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    pub kind: RecordKind,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub record: MoneyRecord,
    pub note: Option<String>,
}

impl StoredRecord {
    pub fn month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRow {
    pub currency: String,
    pub rate_type: String,
    pub rate: String,
    pub as_of: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalRow {
    pub group: String,
    pub total: String,
    pub currency: String,
    pub usd_total: String,
    pub included: usize,
    pub skipped: usize,
}
