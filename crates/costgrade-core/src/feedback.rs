//! Human-readable feedback for a grade report.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grader::{FieldVerdict, GradeReport, Verdict};

/// Currency suffix used in feedback lines.
pub const CURRENCY: &str = "TL";

/// Banner tier shown above the per-field details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Perfect,
    Passed,
    Acceptable,
    TryAgain,
}

impl Standing {
    pub fn from_score(score: f64) -> Self {
        if score >= 100.0 {
            Standing::Perfect
        } else if score >= 80.0 {
            Standing::Passed
        } else if score >= 60.0 {
            Standing::Acceptable
        } else {
            Standing::TryAgain
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Standing::Perfect => "Perfect!",
            Standing::Passed => "Passed.",
            Standing::Acceptable => "Acceptable.",
            Standing::TryAgain => "Try again.",
        }
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.headline())
    }
}

/// One feedback line, e.g. `✘ Customs duty: 121.00 TL (expected: 120.00 TL)`.
pub fn verdict_line(v: &FieldVerdict) -> String {
    let label = v.field.label();
    match v.verdict {
        Verdict::Correct { submitted } => format!("✔ {label}: {submitted:.2} {CURRENCY}"),
        Verdict::Incorrect {
            submitted,
            expected,
        } => format!(
            "✘ {label}: {submitted:.2} {CURRENCY} (expected: {expected:.2} {CURRENCY})"
        ),
        Verdict::Missing => format!("✘ {label}: missing"),
    }
}

/// All feedback lines joined by newlines, in presentation order.
pub fn details(report: &GradeReport) -> String {
    report
        .verdicts
        .iter()
        .map(verdict_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Headline with the rounded score, e.g. `Passed. Score: 83%`.
pub fn headline(report: &GradeReport) -> String {
    format!(
        "{} Score: {:.0}%",
        Standing::from_score(report.score),
        report.score
    )
}
