// 🧾 Sales Report - application state
// Built once at startup: aggregate → assess change → build FAQ

use crate::aggregate::{self, CategoryCount, DailyCount};
use crate::change::{self, ChangeAssessment, Verdict};
use crate::error::InsufficientData;
use crate::faq::FaqResponder;
use crate::loader::Transaction;
use serde::Serialize;
use std::fmt::Write;
use tracing::info;

pub const OBJECTIVES: [&str; 4] = [
    "Plot daily sales for the whole period to understand trends.",
    "Detect and verify statistically significant changes in sales patterns.",
    "Analyze gender influence on sales.",
    "Calculate sales distribution across dayparts: Night, Morning, Afternoon, Evening.",
];

pub const METHODOLOGY: [&str; 2] = [
    "Statistical test: Student's t-test comparing the first and second half of the daily sales series.",
    "Similarity-based FAQ lookup for free-text questions.",
];

/// Result of the change flagger as the presentation layer sees it
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangeStatus {
    Assessed(ChangeAssessment),
    InsufficientData { days: usize },
}

impl ChangeStatus {
    pub fn assessment(&self) -> Option<&ChangeAssessment> {
        match self {
            ChangeStatus::Assessed(a) => Some(a),
            ChangeStatus::InsufficientData { .. } => None,
        }
    }
}

/// Everything the presentation layer renders. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub total_transactions: usize,
    pub daily: Vec<DailyCount>,
    pub gender: Vec<CategoryCount>,
    pub dayparts: Vec<CategoryCount>,
    pub change: ChangeStatus,
    #[serde(skip)]
    pub faq: FaqResponder,
}

impl SalesReport {
    pub fn build(transactions: &[Transaction]) -> Self {
        let daily = aggregate::daily_counts(transactions);
        let gender = aggregate::gender_counts(transactions);
        let dayparts = aggregate::daypart_counts(transactions);

        let change = match change::assess(&daily) {
            Ok(assessment) => ChangeStatus::Assessed(assessment),
            Err(InsufficientData { days }) => ChangeStatus::InsufficientData { days },
        };

        let faq = FaqResponder::new(change.assessment());

        info!(
            transactions = transactions.len(),
            days = daily.len(),
            genders = gender.len(),
            "sales report built"
        );

        SalesReport {
            total_transactions: transactions.len(),
            daily,
            gender,
            dayparts,
            change,
            faq,
        }
    }

    pub fn answer(&self, query: &str) -> &str {
        self.faq.answer(query)
    }

    /// First and last day covered, if any
    pub fn date_range(&self) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
        Some((self.daily.first()?.date, self.daily.last()?.date))
    }

    /// Busiest day (earliest on ties)
    pub fn peak_day(&self) -> Option<&DailyCount> {
        self.daily
            .iter()
            .reduce(|best, d| if d.count > best.count { d } else { best })
    }

    /// Banner text for the change section
    pub fn change_banner(&self) -> String {
        match &self.change {
            ChangeStatus::Assessed(a) => a.verdict().headline().to_string(),
            ChangeStatus::InsufficientData { days } => format!(
                "Not enough data: {} day(s) of sales, at least 2 are needed.",
                days
            ),
        }
    }

    /// Plain-text rendering of the whole report
    pub fn summary(&self) -> String {
        let mut out = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(out, "Sales Data Analysis & Behavioral Insights");
        let _ = writeln!(out, "=========================================");
        let _ = writeln!(out);
        let _ = writeln!(out, "Objectives");
        for line in OBJECTIVES {
            let _ = writeln!(out, "  - {}", line);
        }
        let _ = writeln!(out, "Methodology");
        for line in METHODOLOGY {
            let _ = writeln!(out, "  - {}", line);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Daily Sales Trend");
        let _ = writeln!(out, "  Transactions: {}", self.total_transactions);
        match self.date_range() {
            Some((first, last)) => {
                let _ = writeln!(out, "  Period: {} to {} ({} days with sales)", first, last, self.daily.len());
            }
            None => {
                let _ = writeln!(out, "  Period: no sales loaded");
            }
        }
        if let Some(peak) = self.peak_day() {
            let _ = writeln!(out, "  Busiest day: {} ({} sales)", peak.date, peak.count);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Change Detection in Sales");
        if let Some(a) = self.change.assessment() {
            let _ = writeln!(out, "  Detected change around: {}", a.change_date);
            match a.p_value() {
                Some(p) => {
                    let _ = writeln!(out, "  P-value: {:.5}", p);
                }
                None => {
                    let _ = writeln!(out, "  P-value: n/a");
                }
            }
            let _ = writeln!(
                out,
                "  Mean daily sales: {:.1} before, {:.1} after",
                a.before.mean_daily_sales, a.after.mean_daily_sales
            );
        }
        let marker = match self.change.assessment().map(|a| a.verdict()) {
            Some(Verdict::Significant) => "[!]",
            Some(Verdict::NotSignificant) => "[i]",
            _ => "[?]",
        };
        let _ = writeln!(out, "  {} {}", marker, self.change_banner());
        let _ = writeln!(out);

        write_breakdown(&mut out, "Sales by Gender", &self.gender, self.total_transactions);
        write_breakdown(&mut out, "Sales by Daypart", &self.dayparts, self.total_transactions);

        out
    }
}

fn write_breakdown(out: &mut String, title: &str, counts: &[CategoryCount], total: usize) {
    let _ = writeln!(out, "{}", title);
    for entry in counts {
        let _ = writeln!(
            out,
            "  {:<12} {:>7}  {:>5.1}%",
            entry.label,
            entry.count,
            entry.share(total)
        );
    }
    let _ = writeln!(out);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn transactions(per_day: &[usize]) -> Vec<Transaction> {
        let start = NaiveDate::from_ymd_opt(2013, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let mut out = Vec::new();
        for (day, &n) in per_day.iter().enumerate() {
            for k in 0..n {
                let ts = start + Duration::days(day as i64) + Duration::minutes((k * 37) as i64);
                let gender = if k % 3 == 0 { "male" } else { "female" };
                out.push(Transaction::new(ts, gender));
            }
        }
        out
    }

    #[test]
    fn test_build_consistent_totals() {
        let txs = transactions(&[3, 4, 5, 6, 10, 11, 12, 13]);
        let report = SalesReport::build(&txs);

        assert_eq!(report.total_transactions, 64);
        assert_eq!(report.daily.len(), 8);
        assert_eq!(report.gender.iter().map(|c| c.count).sum::<usize>(), 64);
        assert_eq!(report.dayparts.iter().map(|c| c.count).sum::<usize>(), 64);
        assert_eq!(report.daily.iter().map(|d| d.count).sum::<usize>(), 64);
    }

    #[test]
    fn test_faq_reflects_assessment() {
        let txs = transactions(&[3, 4, 5, 3, 20, 21, 19, 22]);
        let report = SalesReport::build(&txs);

        let assessment = report.change.assessment().unwrap();
        assert_eq!(assessment.verdict(), Verdict::Significant);
        assert!(report
            .answer("What is the detected change date?")
            .contains(&assessment.change_date.to_string()));
        assert!(report
            .answer("What is the p-value?")
            .contains(&format!("{:.5}", assessment.p_value().unwrap())));
    }

    #[test]
    fn test_single_day_reports_insufficient_data() {
        let report = SalesReport::build(&transactions(&[7]));

        assert!(matches!(report.change, ChangeStatus::InsufficientData { days: 1 }));
        assert!(report.change_banner().starts_with("Not enough data"));
        assert!(report.summary().contains("Not enough data"));
    }

    #[test]
    fn test_empty_dataset() {
        let report = SalesReport::build(&[]);

        assert!(matches!(report.change, ChangeStatus::InsufficientData { days: 0 }));

        assert_eq!(report.total_transactions, 0);
        assert!(report.date_range().is_none());
        assert!(report.peak_day().is_none());
        assert!(report.summary().contains("no sales loaded"));
    }

    #[test]
    fn test_peak_day_prefers_earliest() {
        let report = SalesReport::build(&transactions(&[2, 5, 5, 1]));

        let peak = report.peak_day().unwrap();
        assert_eq!(peak.count, 5);
        assert_eq!(peak.date, NaiveDate::from_ymd_opt(2013, 1, 2).unwrap());
    }

    #[test]
    fn test_summary_sections() {
        let report = SalesReport::build(&transactions(&[3, 4, 5, 6]));
        let summary = report.summary();

        assert!(summary.contains("Daily Sales Trend"));
        assert!(summary.contains("Change Detection in Sales"));
        assert!(summary.contains("Sales by Gender"));
        assert!(summary.contains("Sales by Daypart"));
        assert!(summary.contains("Detected change around: 2013-01-03"));
    }

    #[test]
    fn test_serializes_for_api() {
        let report = SalesReport::build(&transactions(&[3, 4, 5, 6]));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["total_transactions"], 18);
        assert_eq!(json["change"]["status"], "assessed");
        assert!(json.get("faq").is_none());
    }
}
