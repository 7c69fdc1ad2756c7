// 🚨 Change Flagger
// Midpoint split of the daily series + Student's t-test
//
// The split point is always n / 2. This is a fixed before/after comparison,
// not a change-point search.

use crate::aggregate::DailyCount;
use crate::error::InsufficientData;
use crate::stats::{self, Degenerate, TTest};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// p-values below this are reported as significant
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Three-way verdict. Indeterminate is never folded into NotSignificant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Significant,
    NotSignificant,
    Indeterminate,
}

impl Verdict {
    pub fn headline(&self) -> &'static str {
        match self {
            Verdict::Significant => "The change is statistically significant.",
            Verdict::NotSignificant => "No significant change detected.",
            Verdict::Indeterminate => "Significance cannot be determined for this data.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TestOutcome {
    Computed(TTest),
    Indeterminate { reason: Degenerate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub days: usize,
    pub mean_daily_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeAssessment {
    /// Index of the first day of the second half
    pub split_index: usize,

    /// Date at `split_index`, reported as the "change date"
    pub change_date: NaiveDate,

    pub before: GroupSummary,
    pub after: GroupSummary,
    pub outcome: TestOutcome,
}

impl ChangeAssessment {
    pub fn verdict(&self) -> Verdict {
        match self.outcome {
            TestOutcome::Computed(test) if test.p_value < SIGNIFICANCE_THRESHOLD => {
                Verdict::Significant
            }
            TestOutcome::Computed(_) => Verdict::NotSignificant,
            TestOutcome::Indeterminate { .. } => Verdict::Indeterminate,
        }
    }

    pub fn is_significant(&self) -> bool {
        self.verdict() == Verdict::Significant
    }

    pub fn statistic(&self) -> Option<f64> {
        match self.outcome {
            TestOutcome::Computed(test) => Some(test.statistic),
            TestOutcome::Indeterminate { .. } => None,
        }
    }

    pub fn p_value(&self) -> Option<f64> {
        match self.outcome {
            TestOutcome::Computed(test) => Some(test.p_value),
            TestOutcome::Indeterminate { .. } => None,
        }
    }

    /// One-line description, e.g. "change around 2013-03-01, p = 0.01234"
    pub fn summary(&self) -> String {
        match self.outcome {
            TestOutcome::Computed(test) => format!(
                "Detected change around {}, t = {:.3}, p = {:.5} ({})",
                self.change_date,
                test.statistic,
                test.p_value,
                self.verdict().headline()
            ),
            TestOutcome::Indeterminate { reason } => format!(
                "Detected change around {}, p = n/a ({})",
                self.change_date,
                reason.describe()
            ),
        }
    }
}

// ============================================================================
// CHANGE FLAGGER
// ============================================================================

/// Index at which a series of length `n` is split
pub fn split_index(n: usize) -> usize {
    n / 2
}

/// Compare the first and second half of the daily series.
///
/// Fails with `InsufficientData` below two days, since each half needs at
/// least one day to exist.
pub fn assess(daily: &[DailyCount]) -> Result<ChangeAssessment, InsufficientData> {
    if daily.len() < 2 {
        warn!(days = daily.len(), "not enough daily counts for change detection");
        return Err(InsufficientData { days: daily.len() });
    }

    let split = split_index(daily.len());
    let counts: Vec<f64> = daily.iter().map(|d| d.count as f64).collect();
    let (first, second) = counts.split_at(split);

    let outcome = match stats::student_t_test(first, second) {
        Ok(test) => TestOutcome::Computed(test),
        Err(reason) => TestOutcome::Indeterminate { reason },
    };

    let assessment = ChangeAssessment {
        split_index: split,
        change_date: daily[split].date,
        before: GroupSummary {
            days: first.len(),
            mean_daily_sales: stats::mean(first),
        },
        after: GroupSummary {
            days: second.len(),
            mean_daily_sales: stats::mean(second),
        },
        outcome,
    };

    info!(
        change_date = %assessment.change_date,
        split = split,
        verdict = ?assessment.verdict(),
        "change assessment complete"
    );

    Ok(assessment)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series(counts: &[usize]) -> Vec<DailyCount> {
        let start = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| DailyCount {
                date: start + Duration::days(i as i64),
                count,
            })
            .collect()
    }

    #[test]
    fn test_split_index_is_floor_half() {
        assert_eq!(split_index(50), 25);
        assert_eq!(split_index(51), 25);
        assert_eq!(split_index(2), 1);
        assert_eq!(split_index(3), 1);
    }

    #[test]
    fn test_fifty_days_split_at_25() {
        let counts: Vec<usize> = (0..50).map(|i| 100 + (i % 7)).collect();
        let daily = series(&counts);

        let assessment = assess(&daily).unwrap();

        assert_eq!(assessment.split_index, 25);
        assert_eq!(assessment.change_date, daily[25].date);
        assert_eq!(assessment.before.days, 25);
        assert_eq!(assessment.after.days, 25);
    }

    #[test]
    fn test_single_day_is_insufficient() {
        assert_eq!(assess(&series(&[42])), Err(InsufficientData { days: 1 }));
        assert_eq!(assess(&[]), Err(InsufficientData { days: 0 }));
    }

    #[test]
    fn test_insufficient_data_converts_to_report_error() {
        let err: crate::error::ReportError = assess(&series(&[7])).unwrap_err().into();

        assert!(matches!(
            err,
            crate::error::ReportError::InsufficientData(InsufficientData { days: 1 })
        ));
        assert_eq!(err.to_string(), "Insufficient data: 1 daily count(s), need at least 2");
    }

    #[test]
    fn test_identical_constant_halves_never_significant() {
        let assessment = assess(&series(&[10, 10, 10, 10, 10, 10, 10, 10])).unwrap();

        assert_eq!(assessment.verdict(), Verdict::Indeterminate);
        assert!(!assessment.is_significant());
        assert!(assessment.p_value().is_none());
        assert_eq!(
            assessment.outcome,
            TestOutcome::Indeterminate { reason: Degenerate::ZeroVariance }
        );
    }

    #[test]
    fn test_two_days_is_indeterminate_not_insignificant() {
        let assessment = assess(&series(&[3, 9])).unwrap();

        assert_eq!(assessment.change_date, NaiveDate::from_ymd_opt(2013, 1, 2).unwrap());
        assert_eq!(assessment.verdict(), Verdict::Indeterminate);
        assert_ne!(assessment.verdict(), Verdict::NotSignificant);
    }

    #[test]
    fn test_clear_shift_is_significant() {
        let assessment = assess(&series(&[20, 22, 19, 21, 20, 23, 30, 29, 31, 32, 30, 28])).unwrap();

        assert_eq!(assessment.verdict(), Verdict::Significant);
        assert!(assessment.statistic().unwrap() < 0.0);
        assert!((assessment.before.mean_daily_sales - 20.833_333).abs() < 1e-5);
        assert!((assessment.after.mean_daily_sales - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_noise_is_not_significant() {
        let assessment = assess(&series(&[10, 12, 11, 13, 10, 11, 12, 14, 13, 11])).unwrap();

        assert_eq!(assessment.verdict(), Verdict::NotSignificant);
        assert!(assessment.p_value().unwrap() >= SIGNIFICANCE_THRESHOLD);
    }

    #[test]
    fn test_deterministic() {
        let daily = series(&[5, 8, 6, 9, 12, 15, 11, 14, 13]);

        let first = assess(&daily).unwrap();
        let second = assess(&daily).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.statistic().map(f64::to_bits), second.statistic().map(f64::to_bits));
    }

    #[test]
    fn test_summary_mentions_date_and_p_value() {
        let assessment = assess(&series(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10])).unwrap();

        let summary = assessment.summary();
        assert!(summary.contains("2013-01-06"));
        assert!(summary.contains("p = 0.00105"));
    }
}
