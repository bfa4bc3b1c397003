//! TOML roster parser.
//!
//! A roster carries the reference data a class needs: students, their
//! invoices, and the answer key for each invoice.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{parse_timestamp, AnswerKey, Invoice, Student, StudentId};

/// Intermediate TOML structure for parsing roster files.
#[derive(Debug, Deserialize)]
struct TomlRoster {
    #[serde(default)]
    students: Vec<TomlStudent>,
}

#[derive(Debug, Deserialize)]
struct TomlStudent {
    student_id: String,
    name: String,
    registration_date: String,
    #[serde(default)]
    invoices: Vec<TomlInvoice>,
}

#[derive(Debug, Deserialize)]
struct TomlInvoice {
    invoice_number: u32,
    product_name: String,
    origin_country: String,
    destination_country: String,
    route_name: String,
    quantity: u32,
    unit_price: f64,
    total_value: f64,
    #[serde(default)]
    answers: Option<AnswerKey>,
}

/// Reference data for a whole class.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub students: Vec<RosterStudent>,
}

/// A student together with their assigned invoices.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterStudent {
    pub student: Student,
    pub invoices: Vec<RosterInvoice>,
}

/// An invoice and, if known, its answer key.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterInvoice {
    pub invoice: Invoice,
    pub answers: Option<AnswerKey>,
}

impl Roster {
    pub fn invoice_count(&self) -> usize {
        self.students.iter().map(|s| s.invoices.len()).sum()
    }

    pub fn answer_key_count(&self) -> usize {
        self.students
            .iter()
            .flat_map(|s| &s.invoices)
            .filter(|i| i.answers.is_some())
            .count()
    }
}

/// Parse a roster TOML file.
pub fn parse_roster(path: &Path) -> Result<Roster> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file: {}", path.display()))?;

    parse_roster_str(&content, path)
}

/// Parse a roster from a TOML string.
pub fn parse_roster_str(content: &str, source_path: &Path) -> Result<Roster> {
    let parsed: TomlRoster = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let students = parsed
        .students
        .into_iter()
        .map(|s| {
            let student_id: StudentId = s
                .student_id
                .parse()
                .map_err(|e: String| anyhow::anyhow!("{}", e))?;
            let registration_date = parse_timestamp(&s.registration_date)
                .map_err(|e| anyhow::anyhow!("student {student_id}: {e}"))?;

            let invoices = s
                .invoices
                .into_iter()
                .map(|i| RosterInvoice {
                    invoice: Invoice {
                        invoice_number: i.invoice_number,
                        product_name: i.product_name,
                        origin_country: i.origin_country,
                        destination_country: i.destination_country,
                        route_name: i.route_name,
                        quantity: i.quantity,
                        unit_price: i.unit_price,
                        total_value: i.total_value,
                    },
                    answers: i.answers,
                })
                .collect();

            Ok(RosterStudent {
                student: Student {
                    student_id,
                    name: s.name,
                    registration_date,
                },
                invoices,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Roster { students })
}

/// A warning from roster validation.
#[derive(Debug, Clone)]
pub struct RosterWarning {
    /// The student the warning concerns, if any.
    pub student_id: Option<StudentId>,
    /// Warning message.
    pub message: String,
}

/// Validate a roster for common data-entry mistakes.
pub fn validate_roster(roster: &Roster) -> Vec<RosterWarning> {
    let mut warnings = Vec::new();
    let warn = |id: &StudentId, message: String| RosterWarning {
        student_id: Some(id.clone()),
        message,
    };

    if roster.students.is_empty() {
        warnings.push(RosterWarning {
            student_id: None,
            message: "roster contains no students".into(),
        });
    }

    let mut seen_students = HashSet::new();
    for entry in &roster.students {
        let id = &entry.student.student_id;

        if !seen_students.insert(id) {
            warnings.push(warn(id, format!("duplicate student ID: {id}")));
        }

        if entry.student.name.trim().is_empty() {
            warnings.push(warn(id, "student name is empty".into()));
        }

        let mut seen_invoices = HashSet::new();
        for inv in &entry.invoices {
            let n = inv.invoice.invoice_number;

            if !seen_invoices.insert(n) {
                warnings.push(warn(id, format!("duplicate invoice number: {n}")));
            }

            if inv.invoice.quantity == 0 {
                warnings.push(warn(id, format!("invoice {n} has zero quantity")));
            }

            if inv.invoice.unit_price < 0.0 || inv.invoice.total_value < 0.0 {
                warnings.push(warn(id, format!("invoice {n} has a negative amount")));
            }

            match &inv.answers {
                None => warnings.push(warn(
                    id,
                    format!("invoice {n} has no answer key and cannot be graded"),
                )),
                Some(key) => {
                    let negative = crate::model::CostField::PRESENTATION_ORDER
                        .iter()
                        .any(|f| key.get(*f) < 0.0);
                    if negative {
                        warnings.push(warn(
                            id,
                            format!("answer key for invoice {n} has a negative value"),
                        ));
                    }
                }
            }
        }
    }

    warnings
}
