//! Per-student aggregate statistics over recorded submissions.

use serde::{Deserialize, Serialize};

use crate::model::{Invoice, Submission};

/// Aggregate view of one student's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSummary {
    /// Invoices assigned to the student.
    pub invoice_count: usize,
    /// Invoices with a recorded submission.
    pub submitted_count: usize,
    /// Mean score over submitted invoices (0 when none).
    pub mean_score: f64,
    /// Best single score (0 when none).
    pub best_score: f64,
    /// Submissions scoring 100.
    pub perfect_count: usize,
}

impl StudentSummary {
    /// Share of assigned invoices that have a submission, in [0, 1].
    pub fn completion_rate(&self) -> f64 {
        if self.invoice_count == 0 {
            return 0.0;
        }
        (self.submitted_count as f64 / self.invoice_count as f64).min(1.0)
    }
}

/// Summarize a student's submissions against their assigned invoices.
///
/// Submissions for invoices no longer assigned are ignored.
pub fn summarize(invoices: &[Invoice], submissions: &[Submission]) -> StudentSummary {
    let relevant: Vec<&Submission> = submissions
        .iter()
        .filter(|s| invoices.iter().any(|i| i.invoice_number == s.invoice_number))
        .collect();

    let submitted_count = relevant.len();
    let mean_score = if submitted_count == 0 {
        0.0
    } else {
        relevant.iter().map(|s| s.score).sum::<f64>() / submitted_count as f64
    };
    let best_score = relevant.iter().map(|s| s.score).fold(0.0, f64::max);
    let perfect_count = relevant.iter().filter(|s| s.score >= 100.0).count();

    StudentSummary {
        invoice_count: invoices.len(),
        submitted_count,
        mean_score,
        best_score,
        perfect_count,
    }
}
