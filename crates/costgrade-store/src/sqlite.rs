//! SQLite-backed answer and submission store.
//!
//! Only this module talks to the database. Every rusqlite error is mapped to
//! a [`StoreError`] before it leaves the store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension};

use costgrade_core::error::{StoreError, StoreResult};
use costgrade_core::model::{
    parse_timestamp, AnswerKey, Invoice, InvoiceNumber, Student, StudentId, Submission,
    SubmittedAnswers,
};
use costgrade_core::roster::Roster;
use costgrade_core::traits::{AnswerStore, SubmissionStore};

const SCHEMA: &str = include_str!("../migrations/001_schema.sql");

const REQUIRED_TABLES: [&str; 4] = [
    "students",
    "invoices",
    "invoice_calculations",
    "submissions",
];

/// Counts of rows written by [`SqliteStore::import_roster`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub students: usize,
    pub invoices: usize,
    pub answer_keys: usize,
}

/// A long-lived handle to the grading database.
///
/// Open it once at startup and pass it by reference; the connection closes
/// when the store is dropped.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>, // None for :memory:
}

impl SqliteStore {
    /// Open an existing database. Fails with [`StoreError::Unavailable`] if
    /// the file is missing, is not a database, or lacks the schema.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            return Err(StoreError::Unavailable(format!(
                "database not found: {}",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI,
        )
        .map_err(|e| unavailable(path, e))?;
        let store = Self::configure(conn, Some(path.to_path_buf()))?;
        store.check_schema()?;
        tracing::debug!(path = %path.display(), "opened grading database");
        Ok(store)
    }

    /// Create (or open) a database file and apply the schema.
    pub fn create(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path).map_err(|e| unavailable(path, e))?;
        let store = Self::configure(conn, Some(path.to_path_buf()))?;
        store.migrate()?;
        tracing::info!(path = %path.display(), "created grading database");
        Ok(store)
    }

    /// Open a migrated in-memory database (used in tests).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let store = Self::configure(conn, None)?;
        store.migrate()?;
        Ok(store)
    }

    fn configure(conn: Connection, path: Option<PathBuf>) -> StoreResult<Self> {
        // WAL mode only applies to real files; :memory: ignores it.
        if let Err(e) = conn.execute_batch("PRAGMA journal_mode=WAL;") {
            tracing::debug!(path = ?path, "could not enable WAL journal mode: {e}");
        }
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(read_error)?;
        Ok(Self { conn, path })
    }

    /// Wait up to `timeout` for another writer to release the database.
    pub fn with_busy_timeout(self, timeout: Duration) -> StoreResult<Self> {
        self.conn.busy_timeout(timeout).map_err(read_error)?;
        Ok(self)
    }

    /// File path, or `None` for an in-memory database.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply the schema. Safe to run repeatedly.
    pub fn migrate(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA).map_err(write_error)
    }

    fn check_schema(&self) -> StoreResult<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
            .map_err(read_error)?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(read_error)?;

        let missing: Vec<&str> = REQUIRED_TABLES
            .into_iter()
            .filter(|t| !tables.iter().any(|name| name.as_str() == *t))
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::Unavailable(format!(
                "schema missing tables: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    // ── Reference data import ──────────────────────────────────

    /// Write a roster in one transaction. Existing rows for the same keys
    /// are replaced; submissions are left untouched.
    pub fn import_roster(&mut self, roster: &Roster) -> StoreResult<ImportStats> {
        let tx = self.conn.transaction().map_err(write_error)?;
        let mut stats = ImportStats::default();

        for entry in &roster.students {
            let s = &entry.student;
            tx.execute(
                "INSERT INTO students (student_id, name, registration_date)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(student_id) DO UPDATE SET
                    name = excluded.name,
                    registration_date = excluded.registration_date",
                params![
                    s.student_id.as_str(),
                    s.name,
                    s.registration_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
                ],
            )
            .map_err(write_error)?;
            stats.students += 1;

            for inv in &entry.invoices {
                let i = &inv.invoice;
                tx.execute(
                    "INSERT INTO invoices (invoice_number, student_id, product_name,
                        origin_country, destination_country, route_name,
                        quantity, unit_price, total_value)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     ON CONFLICT(student_id, invoice_number) DO UPDATE SET
                        product_name = excluded.product_name,
                        origin_country = excluded.origin_country,
                        destination_country = excluded.destination_country,
                        route_name = excluded.route_name,
                        quantity = excluded.quantity,
                        unit_price = excluded.unit_price,
                        total_value = excluded.total_value",
                    params![
                        i.invoice_number,
                        s.student_id.as_str(),
                        i.product_name,
                        i.origin_country,
                        i.destination_country,
                        i.route_name,
                        i.quantity,
                        i.unit_price,
                        i.total_value,
                    ],
                )
                .map_err(write_error)?;
                stats.invoices += 1;

                if let Some(key) = &inv.answers {
                    tx.execute(
                        "INSERT INTO invoice_calculations (student_id, invoice_number,
                            customs_duty, excise_tax, vat, logistics_cost,
                            shipping_cost, total_cost)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                         ON CONFLICT(student_id, invoice_number) DO UPDATE SET
                            customs_duty = excluded.customs_duty,
                            excise_tax = excluded.excise_tax,
                            vat = excluded.vat,
                            logistics_cost = excluded.logistics_cost,
                            shipping_cost = excluded.shipping_cost,
                            total_cost = excluded.total_cost",
                        params![
                            s.student_id.as_str(),
                            i.invoice_number,
                            key.customs_duty,
                            key.excise_tax,
                            key.vat,
                            key.logistics_cost,
                            key.shipping_cost,
                            key.total_cost,
                        ],
                    )
                    .map_err(write_error)?;
                    stats.answer_keys += 1;
                }
            }
        }

        tx.commit().map_err(write_error)?;
        tracing::info!(
            students = stats.students,
            invoices = stats.invoices,
            answer_keys = stats.answer_keys,
            "imported roster"
        );
        Ok(stats)
    }
}

// ── Reference data lookups ─────────────────────────────────────

impl AnswerStore for SqliteStore {
    fn student(&self, student_id: &StudentId) -> StoreResult<Option<Student>> {
        tracing::debug!(student = %student_id, "looking up student");
        let row = self
            .conn
            .query_row(
                "SELECT student_id, name, registration_date
                 FROM students WHERE student_id = ?1",
                params![student_id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(read_error)?;

        row.map(|(id, name, registered)| -> StoreResult<Student> {
            Ok(Student {
                student_id: id
                    .parse::<StudentId>()
                    .map_err(|e| corrupt("students", e))?,
                name,
                registration_date: parse_timestamp(&registered)
                    .map_err(|e| corrupt("students", e))?,
            })
        })
        .transpose()
    }

    fn invoices_for(&self, student_id: &StudentId) -> StoreResult<Vec<Invoice>> {
        tracing::debug!(student = %student_id, "listing invoices");
        let mut stmt = self
            .conn
            .prepare(
                "SELECT invoice_number, product_name, origin_country, destination_country,
                        route_name, quantity, unit_price, total_value
                 FROM invoices WHERE student_id = ?1
                 ORDER BY invoice_number ASC",
            )
            .map_err(read_error)?;
        let invoices = stmt
            .query_map(params![student_id.as_str()], |row| {
                Ok(Invoice {
                    invoice_number: row.get(0)?,
                    product_name: row.get(1)?,
                    origin_country: row.get(2)?,
                    destination_country: row.get(3)?,
                    route_name: row.get(4)?,
                    quantity: row.get(5)?,
                    unit_price: row.get(6)?,
                    total_value: row.get(7)?,
                })
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(read_error)?;
        Ok(invoices)
    }

    fn answer_key(
        &self,
        student_id: &StudentId,
        invoice_number: InvoiceNumber,
    ) -> StoreResult<Option<AnswerKey>> {
        tracing::debug!(student = %student_id, invoice = invoice_number, "fetching answer key");
        self.conn
            .query_row(
                "SELECT customs_duty, excise_tax, vat, logistics_cost, shipping_cost, total_cost
                 FROM invoice_calculations
                 WHERE student_id = ?1 AND invoice_number = ?2",
                params![student_id.as_str(), invoice_number],
                |row| {
                    Ok(AnswerKey {
                        customs_duty: row.get(0)?,
                        excise_tax: row.get(1)?,
                        vat: row.get(2)?,
                        logistics_cost: row.get(3)?,
                        shipping_cost: row.get(4)?,
                        total_cost: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(read_error)
    }
}

// ── Submissions ────────────────────────────────────────────────

/// Raw submission row before timestamp and id decoding.
type SubmissionRow = (String, InvoiceNumber, SubmittedAnswers, f64, String);

const SUBMISSION_COLUMNS: &str = "student_id, invoice_number, customs_duty, excise_tax, vat,
    logistics_cost, shipping_cost, total_cost, score, submission_date";

fn map_submission_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubmissionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        SubmittedAnswers {
            customs_duty: row.get(2)?,
            excise_tax: row.get(3)?,
            vat: row.get(4)?,
            logistics_cost: row.get(5)?,
            shipping_cost: row.get(6)?,
            total_cost: row.get(7)?,
        },
        row.get(8)?,
        row.get(9)?,
    ))
}

fn decode_submission(
    (student_id, invoice_number, answers, score, submitted_at): SubmissionRow,
) -> StoreResult<Submission> {
    Ok(Submission {
        student_id: student_id
            .parse::<StudentId>()
            .map_err(|e| corrupt("submissions", e))?,
        invoice_number,
        answers,
        score,
        submitted_at: parse_utc(&submitted_at).map_err(|e| corrupt("submissions", e))?,
    })
}

impl SubmissionStore for SqliteStore {
    fn record(
        &self,
        student_id: &StudentId,
        invoice_number: InvoiceNumber,
        answers: &SubmittedAnswers,
        score: f64,
    ) -> StoreResult<()> {
        if !(0.0..=100.0).contains(&score) {
            return Err(StoreError::WriteFailed(format!(
                "score out of range: {score}"
            )));
        }

        let answers = answers.normalized();

        // Single statement: SQLite applies it atomically, so the key always
        // holds exactly one complete row.
        self.conn
            .execute(
                "INSERT INTO submissions (student_id, invoice_number, customs_duty, excise_tax,
                    vat, logistics_cost, shipping_cost, total_cost, score, submission_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(student_id, invoice_number) DO UPDATE SET
                    customs_duty = excluded.customs_duty,
                    excise_tax = excluded.excise_tax,
                    vat = excluded.vat,
                    logistics_cost = excluded.logistics_cost,
                    shipping_cost = excluded.shipping_cost,
                    total_cost = excluded.total_cost,
                    score = excluded.score,
                    submission_date = excluded.submission_date",
                params![
                    student_id.as_str(),
                    invoice_number,
                    answers.customs_duty,
                    answers.excise_tax,
                    answers.vat,
                    answers.logistics_cost,
                    answers.shipping_cost,
                    answers.total_cost,
                    score,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(write_error)?;

        tracing::info!(
            student = %student_id,
            invoice = invoice_number,
            score,
            "recorded submission"
        );
        Ok(())
    }

    fn submission(
        &self,
        student_id: &StudentId,
        invoice_number: InvoiceNumber,
    ) -> StoreResult<Option<Submission>> {
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions
             WHERE student_id = ?1 AND invoice_number = ?2"
        );
        self.conn
            .query_row(
                &sql,
                params![student_id.as_str(), invoice_number],
                map_submission_row,
            )
            .optional()
            .map_err(read_error)?
            .map(decode_submission)
            .transpose()
    }

    fn submissions_for(&self, student_id: &StudentId) -> StoreResult<Vec<Submission>> {
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions
             WHERE student_id = ?1 ORDER BY invoice_number ASC"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(read_error)?;
        let rows = stmt
            .query_map(params![student_id.as_str()], map_submission_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(read_error)?;
        rows.into_iter().map(decode_submission).collect()
    }
}

// ── Error mapping ──────────────────────────────────────────────

fn parse_utc(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_timestamp(s).map(|naive| Utc.from_utc_datetime(&naive))
}

fn corrupt(table: &'static str, message: String) -> StoreError {
    StoreError::CorruptRow { table, message }
}

/// Returns true for failures that mean the database as a whole is unusable.
fn is_unavailable(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, msg) => {
            matches!(
                err.code,
                ErrorCode::CannotOpen
                    | ErrorCode::NotADatabase
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::PermissionDenied
            ) || msg
                .as_deref()
                .is_some_and(|m| m.starts_with("no such table"))
        }
        _ => false,
    }
}

fn unavailable(path: &Path, e: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {e}", path.display()))
}

fn read_error(e: rusqlite::Error) -> StoreError {
    if is_unavailable(&e) {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Query(e.to_string())
    }
}

fn write_error(e: rusqlite::Error) -> StoreError {
    if is_unavailable(&e) {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::WriteFailed(e.to_string())
    }
}
