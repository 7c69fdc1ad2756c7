// 📊 Sales Aggregator
// Daily counts, category counts, dayparts

use crate::error::{ReportError, Result};
use crate::loader::Transaction;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

// ============================================================================
// DAYPART
// ============================================================================

/// Daypart - coarse time-of-day bucket derived from the sale hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Daypart {
    /// [0, 6)
    Night,
    /// [6, 12)
    Morning,
    /// [12, 18)
    Afternoon,
    /// [18, 24)
    Evening,
}

impl Daypart {
    pub const ALL: [Daypart; 4] = [
        Daypart::Night,
        Daypart::Morning,
        Daypart::Afternoon,
        Daypart::Evening,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Daypart::Night => "Night",
            Daypart::Morning => "Morning",
            Daypart::Afternoon => "Afternoon",
            Daypart::Evening => "Evening",
        }
    }

    /// Hour range covered, as (start inclusive, end exclusive)
    pub fn hours(&self) -> (u32, u32) {
        match self {
            Daypart::Night => (0, 6),
            Daypart::Morning => (6, 12),
            Daypart::Afternoon => (12, 18),
            Daypart::Evening => (18, 24),
        }
    }

    /// Infallible form for already-parsed timestamps (hour is always 0-23)
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        match timestamp.hour() {
            0..=5 => Daypart::Night,
            6..=11 => Daypart::Morning,
            12..=17 => Daypart::Afternoon,
            _ => Daypart::Evening,
        }
    }
}

impl fmt::Display for Daypart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map an hour of day to its daypart. Hours outside 0-23 are rejected.
pub fn daypart_of(hour: u32) -> Result<Daypart> {
    match hour {
        0..=5 => Ok(Daypart::Night),
        6..=11 => Ok(Daypart::Morning),
        12..=17 => Ok(Daypart::Afternoon),
        18..=23 => Ok(Daypart::Evening),
        _ => Err(ReportError::InvalidInput(format!(
            "hour {} is outside 0-23",
            hour
        ))),
    }
}

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

impl CategoryCount {
    /// Share of `total` as a percentage (0.0 when total is 0)
    pub fn share(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.count as f64 / total as f64 * 100.0
        }
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Transactions per calendar date, ascending. Dates without sales are not
/// filled in.
pub fn daily_counts(transactions: &[Transaction]) -> Vec<DailyCount> {
    let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for tx in transactions {
        *by_date.entry(tx.sale_date()).or_insert(0) += 1;
    }

    let daily: Vec<DailyCount> = by_date
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect();

    debug!(days = daily.len(), "computed daily counts");
    daily
}

/// Count transactions per label produced by `selector`.
///
/// Entries come back largest first, ties by label, so repeated calls list
/// them identically.
pub fn category_counts<F, L>(transactions: &[Transaction], selector: F) -> Vec<CategoryCount>
where
    F: Fn(&Transaction) -> L,
    L: Into<String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();

    for tx in transactions {
        *counts.entry(selector(tx).into()).or_insert(0) += 1;
    }

    let mut result: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount { label, count })
        .collect();

    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    result
}

pub fn gender_counts(transactions: &[Transaction]) -> Vec<CategoryCount> {
    category_counts(transactions, |tx| tx.gender.clone())
}

pub fn daypart_counts(transactions: &[Transaction]) -> Vec<CategoryCount> {
    category_counts(transactions, |tx| Daypart::of(&tx.sale_time).name())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(timestamp: &str, gender: &str) -> Transaction {
        let sale_time = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").unwrap();
        Transaction::new(sale_time, gender)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("2013-01-08 01:10:00", "male"),
            tx("2013-01-07 06:00:00", "female"),
            tx("2013-01-07 11:59:59", "female"),
            tx("2013-01-07 12:00:00", "male"),
            tx("2013-01-10 23:30:00", "female"),
            tx("2013-01-10 18:00:00", "female"),
        ]
    }

    #[test]
    fn test_daypart_boundaries() {
        assert_eq!(daypart_of(0).unwrap(), Daypart::Night);
        assert_eq!(daypart_of(5).unwrap(), Daypart::Night);
        assert_eq!(daypart_of(6).unwrap(), Daypart::Morning);
        assert_eq!(daypart_of(11).unwrap(), Daypart::Morning);
        assert_eq!(daypart_of(12).unwrap(), Daypart::Afternoon);
        assert_eq!(daypart_of(17).unwrap(), Daypart::Afternoon);
        assert_eq!(daypart_of(18).unwrap(), Daypart::Evening);
        assert_eq!(daypart_of(23).unwrap(), Daypart::Evening);
    }

    #[test]
    fn test_daypart_partitions_every_hour() {
        for hour in 0..24 {
            let part = daypart_of(hour).unwrap();
            let covering: Vec<_> = Daypart::ALL
                .iter()
                .filter(|p| {
                    let (start, end) = p.hours();
                    hour >= start && hour < end
                })
                .collect();

            assert_eq!(covering, vec![&part], "hour {}", hour);
        }
    }

    #[test]
    fn test_daypart_rejects_out_of_range() {
        assert!(matches!(daypart_of(24), Err(ReportError::InvalidInput(_))));
        assert!(daypart_of(99).is_err());
    }

    #[test]
    fn test_daily_counts_sorted_without_gaps() {
        let daily = daily_counts(&sample());

        let dates: Vec<String> = daily.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2013-01-07", "2013-01-08", "2013-01-10"]);

        let counts: Vec<usize> = daily.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![3, 1, 2]);
    }

    #[test]
    fn test_daily_counts_empty() {
        assert!(daily_counts(&[]).is_empty());
    }

    #[test]
    fn test_category_counts_sum_to_total() {
        let transactions = sample();

        let genders = gender_counts(&transactions);
        let dayparts = daypart_counts(&transactions);

        assert_eq!(genders.iter().map(|c| c.count).sum::<usize>(), transactions.len());
        assert_eq!(dayparts.iter().map(|c| c.count).sum::<usize>(), transactions.len());
    }

    #[test]
    fn test_gender_counts() {
        let genders = gender_counts(&sample());

        assert_eq!(genders.len(), 2);
        assert_eq!(genders[0], CategoryCount { label: "female".to_string(), count: 4 });
        assert_eq!(genders[1], CategoryCount { label: "male".to_string(), count: 2 });
    }

    #[test]
    fn test_daypart_counts_only_observed_labels() {
        let transactions = vec![
            tx("2013-01-07 07:00:00", "male"),
            tx("2013-01-07 08:00:00", "male"),
            tx("2013-01-07 20:00:00", "male"),
        ];

        let dayparts = daypart_counts(&transactions);

        assert_eq!(dayparts.len(), 2);
        assert_eq!(dayparts[0].label, "Morning");
        assert_eq!(dayparts[0].count, 2);
        assert_eq!(dayparts[1].label, "Evening");
    }

    #[test]
    fn test_custom_selector() {
        let by_weekday = category_counts(&sample(), |tx| tx.sale_time.format("%A").to_string());
        assert_eq!(by_weekday.iter().map(|c| c.count).sum::<usize>(), 6);
    }

    #[test]
    fn test_share() {
        let entry = CategoryCount { label: "Night".to_string(), count: 1 };
        assert!((entry.share(4) - 25.0).abs() < 1e-9);
        assert_eq!(entry.share(0), 0.0);
    }
}
