// Sales Insights - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod error;
pub mod config;
pub mod loader;      // CSV → transactions
pub mod aggregate;   // Daily counts, category counts, dayparts
pub mod stats;       // Student's t-test
pub mod change;      // Midpoint change flagger
pub mod similarity;  // Ratcliff/Obershelp ratio
pub mod faq;         // FAQ responder
pub mod report;      // Application state

// Re-export commonly used types
pub use error::{InsufficientData, ReportError, Result};
pub use config::AppConfig;
pub use loader::{Transaction, load_csv, load_from_reader, parse_timestamp};
pub use aggregate::{
    Daypart, DailyCount, CategoryCount,
    daypart_of, daily_counts, category_counts, gender_counts, daypart_counts,
};
pub use stats::{TTest, Degenerate, student_t_test};
pub use change::{
    ChangeAssessment, TestOutcome, Verdict, GroupSummary,
    assess, split_index, SIGNIFICANCE_THRESHOLD,
};
pub use similarity::{ratio, longest_match, matching_blocks, MatchBlock};
pub use faq::{FaqResponder, FaqEntry, FaqMatch, FALLBACK_ANSWER, SIMILARITY_CUTOFF};
pub use report::{SalesReport, ChangeStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
