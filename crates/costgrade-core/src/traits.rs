//! Store traits for reference data and submissions.
//!
//! Implemented by `costgrade-store`. Handles are passed explicitly into the
//! grading workflow; nothing here holds global state.

use crate::error::StoreResult;
use crate::model::{
    AnswerKey, Invoice, InvoiceNumber, Student, StudentId, Submission, SubmittedAnswers,
};

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// Read-only access to students, invoices and answer keys.
pub trait AnswerStore {
    /// Look up a student by identifier.
    fn student(&self, student_id: &StudentId) -> StoreResult<Option<Student>>;

    /// All invoices assigned to a student, ordered by invoice number ascending.
    fn invoices_for(&self, student_id: &StudentId) -> StoreResult<Vec<Invoice>>;

    /// The answer key for one (student, invoice) pair.
    fn answer_key(
        &self,
        student_id: &StudentId,
        invoice_number: InvoiceNumber,
    ) -> StoreResult<Option<AnswerKey>>;
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// Write access to the latest submission per (student, invoice).
pub trait SubmissionStore {
    /// Store the latest submission for the key, replacing any previous one.
    ///
    /// Either the whole row is written or nothing is.
    fn record(
        &self,
        student_id: &StudentId,
        invoice_number: InvoiceNumber,
        answers: &SubmittedAnswers,
        score: f64,
    ) -> StoreResult<()>;

    /// The recorded submission for one key, if any.
    fn submission(
        &self,
        student_id: &StudentId,
        invoice_number: InvoiceNumber,
    ) -> StoreResult<Option<Submission>>;

    /// All recorded submissions of a student, ordered by invoice number.
    fn submissions_for(&self, student_id: &StudentId) -> StoreResult<Vec<Submission>>;
}
