// 💬 FAQ Responder
// Closest stored question wins if it scores at least SIMILARITY_CUTOFF

use crate::change::{ChangeAssessment, TestOutcome, Verdict};
use crate::similarity::Scorer;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum similarity for a stored question to be selected
pub const SIMILARITY_CUTOFF: f64 = 0.4;

pub const FALLBACK_ANSWER: &str =
    "Sorry, I couldn't find a matching answer. Try rephrasing your question.";

const SUGGESTIONS: [&str; 3] = [
    "What is the p-value?",
    "What does daypart analysis mean?",
    "What is the objective of this project?",
];

const OBJECTIVE_Q: &str = "What is the objective of this project?";
const CHANGE_DATE_Q: &str = "What is the detected change date?";
const P_VALUE_Q: &str = "What is the p-value?";
const LOW_P_VALUE_Q: &str = "What does a low p-value mean?";
const DAYPART_Q: &str = "What is daypart analysis?";
const GENDER_Q: &str = "What is the gender distribution in sales?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    fn new(question: &str, answer: impl Into<String>) -> Self {
        FaqEntry {
            question: question.to_string(),
            answer: answer.into(),
        }
    }
}

/// A stored question selected for a query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaqMatch<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub score: f64,
}

/// Fixed question → answer table, immutable after construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqResponder {
    entries: Vec<FaqEntry>,
}

impl FaqResponder {
    /// Build the table. `None` means the change flagger had too little data.
    pub fn new(change: Option<&ChangeAssessment>) -> Self {
        let entries = vec![
            FaqEntry::new(
                OBJECTIVE_Q,
                "To analyze daily sales, detect significant changes, and understand patterns based on gender and time of day.",
            ),
            FaqEntry::new(CHANGE_DATE_Q, change_date_answer(change)),
            FaqEntry::new(P_VALUE_Q, p_value_answer(change)),
            FaqEntry::new(
                LOW_P_VALUE_Q,
                "A low p-value (< 0.05) means the change in sales is statistically significant and unlikely due to random chance.",
            ),
            FaqEntry::new(
                DAYPART_Q,
                "It breaks each day into segments like Morning, Afternoon, Evening, and Night to observe time-based patterns in sales.",
            ),
            FaqEntry::new(
                GENDER_Q,
                "The bar chart shows how sales are distributed across male and female customers.",
            ),
        ];

        FaqResponder { entries }
    }

    /// Example prompts shown next to the input box
    pub fn suggestions(&self) -> &'static [&'static str] {
        &SUGGESTIONS
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    /// Highest-scoring question at or above the cutoff.
    ///
    /// Ties go to the lexicographically greatest question. Blank queries
    /// never match.
    pub fn best_match(&self, query: &str) -> Option<FaqMatch<'_>> {
        if query.trim().is_empty() {
            return None;
        }

        let scorer = Scorer::new(query);
        let mut best: Option<FaqMatch<'_>> = None;

        for entry in &self.entries {
            let score = scorer.score(&entry.question);
            if score < SIMILARITY_CUTOFF {
                continue;
            }

            let better = match &best {
                None => true,
                Some(b) => {
                    score > b.score || (score == b.score && entry.question.as_str() > b.question)
                }
            };

            if better {
                best = Some(FaqMatch {
                    question: &entry.question,
                    answer: &entry.answer,
                    score,
                });
            }
        }

        debug!(
            query = query,
            matched = best.map(|m| m.question),
            score = best.map(|m| m.score),
            "faq lookup"
        );

        best
    }

    /// Answer for `query`, or `FALLBACK_ANSWER` when nothing is close enough
    pub fn answer(&self, query: &str) -> &str {
        self.best_match(query)
            .map(|m| m.answer)
            .unwrap_or(FALLBACK_ANSWER)
    }
}

fn change_date_answer(change: Option<&ChangeAssessment>) -> String {
    let Some(assessment) = change else {
        return "There is not enough daily sales data to detect a change.".to_string();
    };

    match (assessment.verdict(), assessment.outcome) {
        (Verdict::Significant, _) => format!(
            "The model detected a significant change in sales around {}.",
            assessment.change_date
        ),
        (Verdict::NotSignificant, _) => format!(
            "The sales series was compared before and after {}, but the difference is not statistically significant.",
            assessment.change_date
        ),
        (Verdict::Indeterminate, TestOutcome::Indeterminate { reason }) => format!(
            "The sales series was compared before and after {}, but significance could not be determined: {}.",
            assessment.change_date,
            reason.describe()
        ),
        (Verdict::Indeterminate, _) => format!(
            "The sales series was compared before and after {}, but significance could not be determined.",
            assessment.change_date
        ),
    }
}

fn p_value_answer(change: Option<&ChangeAssessment>) -> String {
    match change.map(|a| a.outcome) {
        Some(TestOutcome::Computed(test)) => format!(
            "The p-value is {:.5}, which indicates the statistical significance of the change.",
            test.p_value
        ),
        Some(TestOutcome::Indeterminate { reason }) => {
            format!("The p-value could not be computed: {}.", reason.describe())
        }
        None => "No p-value is available: there is not enough daily sales data.".to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
