//! Grade-and-record workflow.
//!
//! Looks up the answer key, grades, and persists the result. Store failures
//! never escape as errors here; each one becomes a [`SubmitOutcome`] variant
//! the presentation layer can show verbatim.

use serde::{Deserialize, Serialize};

use crate::grader::{grade, GradeReport};
use crate::model::{InvoiceNumber, StudentId, SubmittedAnswers};
use crate::traits::{AnswerStore, SubmissionStore};

/// What happened to one submission attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Graded and saved.
    Recorded(GradeReport),
    /// Graded, but the write failed. The student must retry.
    NotRecorded { report: GradeReport, reason: String },
    /// No answer key exists for this student and invoice.
    ReferenceNotFound,
    /// The database could not be reached at all.
    StoreUnavailable { reason: String },
    /// The database was reachable but the answer key lookup failed.
    LookupFailed { reason: String },
}

impl SubmitOutcome {
    /// Score to show; zero when nothing was graded.
    pub fn score(&self) -> f64 {
        self.report().map_or(0.0, |r| r.score)
    }

    /// The grade report, if grading took place.
    pub fn report(&self) -> Option<&GradeReport> {
        match self {
            SubmitOutcome::Recorded(report) | SubmitOutcome::NotRecorded { report, .. } => {
                Some(report)
            }
            SubmitOutcome::ReferenceNotFound
            | SubmitOutcome::StoreUnavailable { .. }
            | SubmitOutcome::LookupFailed { .. } => None,
        }
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, SubmitOutcome::Recorded(_))
    }

    /// User-facing status sentence, distinct per variant.
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Recorded(_) => "Your answers have been saved.".to_string(),
            SubmitOutcome::NotRecorded { reason, .. } => {
                format!("Your answers could not be saved ({reason}). Please submit again.")
            }
            SubmitOutcome::ReferenceNotFound => {
                "No answer key was found for this invoice. Score: 0.".to_string()
            }
            SubmitOutcome::StoreUnavailable { reason } => {
                format!("The grading database is unavailable ({reason}). Score: 0.")
            }
            SubmitOutcome::LookupFailed { reason } => {
                format!("The answer key could not be read ({reason}). Score: 0.")
            }
        }
    }
}

/// Grade a submission against the stored answer key and record the result.
pub fn submit<A, S>(
    answers: &A,
    submissions: &S,
    student_id: &StudentId,
    invoice_number: InvoiceNumber,
    submitted: &SubmittedAnswers,
) -> SubmitOutcome
where
    A: AnswerStore + ?Sized,
    S: SubmissionStore + ?Sized,
{
    let key = match answers.answer_key(student_id, invoice_number) {
        Ok(Some(key)) => key,
        Ok(None) => {
            tracing::warn!(
                student = %student_id,
                invoice = invoice_number,
                "no answer key, submission not graded"
            );
            return SubmitOutcome::ReferenceNotFound;
        }
        Err(e) => {
            tracing::warn!(
                student = %student_id,
                invoice = invoice_number,
                "answer key lookup failed: {e}"
            );
            let reason = e.to_string();
            return if e.is_unavailable() {
                SubmitOutcome::StoreUnavailable { reason }
            } else {
                SubmitOutcome::LookupFailed { reason }
            };
        }
    };

    let submitted = submitted.normalized();
    let report = grade(&key, &submitted);
    tracing::debug!(
        student = %student_id,
        invoice = invoice_number,
        correct = report.correct_count,
        "graded submission"
    );

    match submissions.record(student_id, invoice_number, &submitted, report.score) {
        Ok(()) => SubmitOutcome::Recorded(report),
        Err(e) => {
            tracing::warn!(
                student = %student_id,
                invoice = invoice_number,
                "failed to record submission: {e}"
            );
            SubmitOutcome::NotRecorded {
                report,
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use crate::model::{AnswerKey, CostField, Invoice, Student, Submission};
    use std::cell::RefCell;

    /// In-memory double for both store traits.
    #[derive(Default)]
    struct FakeStore {
        key: Option<AnswerKey>,
        lookup_fails: bool,
        corrupt_key: bool,
        write_fails: bool,
        recorded: RefCell<Vec<(InvoiceNumber, SubmittedAnswers, f64)>>,
    }

    impl AnswerStore for FakeStore {
        fn student(&self, _: &StudentId) -> StoreResult<Option<Student>> {
            Ok(None)
        }

        fn invoices_for(&self, _: &StudentId) -> StoreResult<Vec<Invoice>> {
            Ok(vec![])
        }

        fn answer_key(&self, _: &StudentId, _: InvoiceNumber) -> StoreResult<Option<AnswerKey>> {
            if self.lookup_fails {
                return Err(StoreError::Unavailable("database missing".into()));
            }
            if self.corrupt_key {
                return Err(StoreError::CorruptRow {
                    table: "answer_keys",
                    message: "vat is not a number".into(),
                });
            }
            Ok(self.key)
        }
    }

    impl SubmissionStore for FakeStore {
        fn record(
            &self,
            _: &StudentId,
            invoice_number: InvoiceNumber,
            answers: &SubmittedAnswers,
            score: f64,
        ) -> StoreResult<()> {
            if self.write_fails {
                return Err(StoreError::WriteFailed("disk I/O error".into()));
            }
            self.recorded
                .borrow_mut()
                .push((invoice_number, *answers, score));
            Ok(())
        }

        fn submission(&self, _: &StudentId, _: InvoiceNumber) -> StoreResult<Option<Submission>> {
            Ok(None)
        }

        fn submissions_for(&self, _: &StudentId) -> StoreResult<Vec<Submission>> {
            Ok(vec![])
        }
    }

    fn key() -> AnswerKey {
        AnswerKey {
            customs_duty: 120.0,
            excise_tax: 80.0,
            vat: 150.0,
            logistics_cost: 500.0,
            shipping_cost: 300.0,
            total_cost: 1150.0,
        }
    }

    fn student() -> StudentId {
        "1212603034".parse().unwrap()
    }

    #[test]
    fn graded_and_recorded() {
        let store = FakeStore {
            key: Some(key()),
            ..Default::default()
        };
        let outcome = submit(&store, &store, &student(), 7, &SubmittedAnswers::from(key()));

        assert!(outcome.is_recorded());
        assert_eq!(outcome.score(), 100.0);
        let recorded = store.recorded.borrow();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, 7);
        assert_eq!(recorded[0].2, 100.0);
    }

    #[test]
    fn missing_reference_scores_zero_and_records_nothing() {
        let store = FakeStore::default();
        let outcome = submit(&store, &store, &student(), 1, &SubmittedAnswers::from(key()));

        assert_eq!(outcome, SubmitOutcome::ReferenceNotFound);
        assert_eq!(outcome.score(), 0.0);
        assert!(outcome.report().is_none());
        assert!(store.recorded.borrow().is_empty());
    }

    #[test]
    fn unavailable_store_scores_zero() {
        let store = FakeStore {
            key: Some(key()),
            lookup_fails: true,
            ..Default::default()
        };
        let outcome = submit(&store, &store, &student(), 1, &SubmittedAnswers::from(key()));

        assert!(matches!(outcome, SubmitOutcome::StoreUnavailable { .. }));
        assert_eq!(outcome.score(), 0.0);
        assert!(outcome.message().contains("unavailable"));
        assert!(store.recorded.borrow().is_empty());
    }

    #[test]
    fn corrupt_key_is_not_reported_as_unavailable() {
        let store = FakeStore {
            key: Some(key()),
            corrupt_key: true,
            ..Default::default()
        };
        let outcome = submit(&store, &store, &student(), 1, &SubmittedAnswers::from(key()));

        assert!(matches!(outcome, SubmitOutcome::LookupFailed { .. }));
        assert_eq!(outcome.score(), 0.0);
        assert!(!outcome.message().contains("unavailable"));
        assert!(outcome.message().contains("could not be read"));
        assert!(store.recorded.borrow().is_empty());
    }

    #[test]
    fn non_finite_answers_recorded_as_empty() {
        let store = FakeStore {
            key: Some(key()),
            ..Default::default()
        };
        let mut answers = SubmittedAnswers::from(key());
        answers.vat = Some(f64::INFINITY);
        let outcome = submit(&store, &store, &student(), 1, &answers);

        assert!(outcome.is_recorded());
        assert_eq!(outcome.report().map(|r| r.correct_count), Some(5));
        let recorded = store.recorded.borrow();
        assert_eq!(recorded[0].1.vat, None);
        assert_eq!(recorded[0].1.missing_fields(), vec![CostField::Vat]);
    }

    #[test]
    fn failed_write_keeps_report_but_is_not_recorded() {
        let store = FakeStore {
            key: Some(key()),
            write_fails: true,
            ..Default::default()
        };
        let outcome = submit(&store, &store, &student(), 1, &SubmittedAnswers::from(key()));

        assert!(!outcome.is_recorded());
        assert!(matches!(outcome, SubmitOutcome::NotRecorded { .. }));
        assert_eq!(outcome.report().map(|r| r.correct_count), Some(6));
        assert!(outcome.message().contains("could not be saved"));
    }

    #[test]
    fn incomplete_submission_is_still_recorded() {
        let store = FakeStore {
            key: Some(key()),
            ..Default::default()
        };
        let mut answers = SubmittedAnswers::from(key());
        answers.vat = None;
        let outcome = submit(&store, &store, &student(), 3, &answers);

        assert!(outcome.is_recorded());
        assert!((outcome.score() - 83.33).abs() < 0.01);
        assert_eq!(store.recorded.borrow()[0].1.vat, None);
    }

    #[test]
    fn messages_are_distinct() {
        let report = grade(&key(), &SubmittedAnswers::default());
        let messages = [
            SubmitOutcome::Recorded(report.clone()).message(),
            SubmitOutcome::NotRecorded {
                report,
                reason: "x".into(),
            }
            .message(),
            SubmitOutcome::ReferenceNotFound.message(),
            SubmitOutcome::StoreUnavailable { reason: "x".into() }.message(),
            SubmitOutcome::LookupFailed { reason: "x".into() }.message(),
        ];
        let unique: std::collections::HashSet<_> = messages.iter().collect();
        assert_eq!(unique.len(), 5);
    }
}
