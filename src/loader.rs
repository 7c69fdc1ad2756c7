// 📂 Dataset Loader
// CSV → Vec<Transaction>, all-or-nothing

use crate::error::{ReportError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Row exactly as it appears in the CSV. Only the two columns the report
/// needs are named; every other column is ignored by the deserializer.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "sale_time")]
    sale_time: String,

    #[serde(rename = "purchaser_gender")]
    purchaser_gender: String,
}

/// Transaction - one sale, immutable after load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sale_time: NaiveDateTime,
    pub gender: String,
}

impl Transaction {
    pub fn new(sale_time: NaiveDateTime, gender: impl Into<String>) -> Self {
        Transaction {
            sale_time,
            gender: gender.into(),
        }
    }

    /// Calendar date of the sale
    pub fn sale_date(&self) -> NaiveDate {
        self.sale_time.date()
    }
}

// ============================================================================
// TIMESTAMP PARSING
// ============================================================================

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a combined date+time value.
///
/// Accepts the layouts pandas writes for datetime columns, RFC 3339 (the
/// offset is dropped and the wall-clock time kept), and a bare date, which
/// is read as midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

// ============================================================================
// LOADING
// ============================================================================

pub fn load_csv(csv_path: &Path) -> Result<Vec<Transaction>> {
    info!(path = %csv_path.display(), "loading sales dataset");
    let rdr = csv::Reader::from_path(csv_path)?;
    let transactions = read_transactions(rdr)?;
    info!(count = transactions.len(), "dataset loaded");
    Ok(transactions)
}

/// Load from any reader with a header row (used by tests and stdin input)
pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    read_transactions(csv::Reader::from_reader(reader))
}

fn read_transactions<R: Read>(mut rdr: csv::Reader<R>) -> Result<Vec<Transaction>> {
    let mut transactions = Vec::new();

    for (index, result) in rdr.deserialize::<RawRow>().enumerate() {
        let line = index + 1;
        let row = result.map_err(|e| ReportError::Load {
            line,
            message: e.to_string(),
        })?;

        let sale_time = parse_timestamp(&row.sale_time).ok_or_else(|| ReportError::Load {
            line,
            message: format!("unparseable sale_time {:?}", row.sale_time),
        })?;

        let gender = row.purchaser_gender.trim();
        if gender.is_empty() {
            return Err(ReportError::Load {
                line,
                message: "purchaser_gender is empty".to_string(),
            });
        }

        transactions.push(Transaction::new(sale_time, gender));
    }

    debug!(rows = transactions.len(), "parsed transaction rows");
    Ok(transactions)
}

// ============================================================================
// TESTS
// ============================================================================
