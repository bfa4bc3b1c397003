//! Tolerance-based grading of submitted cost figures.
//!
//! Each of the six fields is compared against the answer key by absolute
//! difference. The score is the share of fields within [`TOLERANCE`], always
//! out of six regardless of how many fields were filled in.

use serde::{Deserialize, Serialize};

use crate::model::{AnswerKey, CostField, SubmittedAnswers};

/// Maximum absolute difference, in currency units, still graded as correct.
pub const TOLERANCE: f64 = 0.5;

/// Number of graded fields; the fixed score denominator.
pub const FIELD_COUNT: usize = CostField::PRESENTATION_ORDER.len();

/// Outcome for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Correct { submitted: f64 },
    Incorrect { submitted: f64, expected: f64 },
    Missing,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct { .. })
    }
}

/// A verdict tagged with the field it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldVerdict {
    pub field: CostField,
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// Result of grading one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    /// Percentage in [0, 100].
    pub score: f64,
    /// Number of fields within tolerance.
    pub correct_count: usize,
    /// One verdict per field, in [`CostField::PRESENTATION_ORDER`].
    pub verdicts: Vec<FieldVerdict>,
}

impl GradeReport {
    /// Verdict for a specific field.
    pub fn verdict(&self, field: CostField) -> Option<Verdict> {
        self.verdicts
            .iter()
            .find(|v| v.field == field)
            .map(|v| v.verdict)
    }

    /// Returns true if every field was within tolerance.
    pub fn is_perfect(&self) -> bool {
        self.correct_count == FIELD_COUNT
    }
}

/// Judge one field. Non-finite input counts as not submitted.
pub fn judge(submitted: Option<f64>, expected: f64) -> Verdict {
    match submitted {
        Some(value) if value.is_finite() => {
            if (value - expected).abs() <= TOLERANCE {
                Verdict::Correct { submitted: value }
            } else {
                Verdict::Incorrect {
                    submitted: value,
                    expected,
                }
            }
        }
        _ => Verdict::Missing,
    }
}

/// Score as a percentage of [`FIELD_COUNT`].
pub fn score_for(correct_count: usize) -> f64 {
    correct_count.min(FIELD_COUNT) as f64 / FIELD_COUNT as f64 * 100.0
}

/// Grade a submission against its answer key.
pub fn grade(reference: &AnswerKey, submitted: &SubmittedAnswers) -> GradeReport {
    let verdicts: Vec<FieldVerdict> = CostField::PRESENTATION_ORDER
        .into_iter()
        .map(|field| FieldVerdict {
            field,
            verdict: judge(submitted.get(field), reference.get(field)),
        })
        .collect();

    let correct_count = verdicts.iter().filter(|v| v.verdict.is_correct()).count();

    GradeReport {
        score: score_for(correct_count),
        correct_count,
        verdicts,
    }
}
