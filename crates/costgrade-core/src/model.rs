//! Core data model types for costgrade.
//!
//! Reference data (students, invoices, answer keys) is immutable; submissions
//! are the only records the grading workflow writes.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of characters in a student identifier.
pub const STUDENT_ID_LEN: usize = 10;

/// A validated student identifier: exactly ten ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentId(String);

impl StudentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StudentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != STUDENT_ID_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!(
                "invalid student id '{s}': expected {STUDENT_ID_LEN} digits"
            ));
        }
        Ok(StudentId(s.to_string()))
    }
}

impl TryFrom<String> for StudentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StudentId> for String {
    fn from(id: StudentId) -> Self {
        id.0
    }
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339, ISO 8601 without offset (`T` or space separated, with
/// optional fraction), or a bare `YYYY-MM-DD` date taken as midnight.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("unrecognized timestamp: {s}"))
}

/// Invoice numbers are unique per student.
pub type InvoiceNumber = u32;

/// A registered student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: StudentId,
    /// Display name.
    pub name: String,
    pub registration_date: NaiveDateTime,
}

/// An invoice assigned to a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: InvoiceNumber,
    pub product_name: String,
    pub origin_country: String,
    pub destination_country: String,
    pub route_name: String,
    pub quantity: u32,
    /// Unit price in the source currency.
    pub unit_price: f64,
    /// Total value in the source currency.
    pub total_value: f64,
}

/// One of the six graded monetary fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostField {
    LogisticsCost,
    ShippingCost,
    CustomsDuty,
    ExciseTax,
    Vat,
    TotalCost,
}

impl CostField {
    /// The order verdicts are reported in.
    pub const PRESENTATION_ORDER: [CostField; 6] = [
        CostField::LogisticsCost,
        CostField::ShippingCost,
        CostField::CustomsDuty,
        CostField::ExciseTax,
        CostField::Vat,
        CostField::TotalCost,
    ];

    /// Column / key name used in storage and JSON.
    pub fn key(self) -> &'static str {
        match self {
            CostField::LogisticsCost => "logistics_cost",
            CostField::ShippingCost => "shipping_cost",
            CostField::CustomsDuty => "customs_duty",
            CostField::ExciseTax => "excise_tax",
            CostField::Vat => "vat",
            CostField::TotalCost => "total_cost",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            CostField::LogisticsCost => "Logistics cost",
            CostField::ShippingCost => "Shipping cost",
            CostField::CustomsDuty => "Customs duty",
            CostField::ExciseTax => "Excise tax",
            CostField::Vat => "VAT",
            CostField::TotalCost => "Total cost",
        }
    }
}

impl fmt::Display for CostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CostField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "logistics_cost" => Ok(CostField::LogisticsCost),
            "shipping_cost" => Ok(CostField::ShippingCost),
            "customs_duty" => Ok(CostField::CustomsDuty),
            "excise_tax" => Ok(CostField::ExciseTax),
            "vat" => Ok(CostField::Vat),
            "total_cost" => Ok(CostField::TotalCost),
            other => Err(format!("unknown cost field: {other}")),
        }
    }
}

/// Reference values for one (student, invoice) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnswerKey {
    pub customs_duty: f64,
    pub excise_tax: f64,
    pub vat: f64,
    pub logistics_cost: f64,
    pub shipping_cost: f64,
    pub total_cost: f64,
}

impl AnswerKey {
    pub fn get(&self, field: CostField) -> f64 {
        match field {
            CostField::LogisticsCost => self.logistics_cost,
            CostField::ShippingCost => self.shipping_cost,
            CostField::CustomsDuty => self.customs_duty,
            CostField::ExciseTax => self.excise_tax,
            CostField::Vat => self.vat,
            CostField::TotalCost => self.total_cost,
        }
    }
}

/// The values a student entered. `None` means the field was left empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswers {
    #[serde(default)]
    pub customs_duty: Option<f64>,
    #[serde(default)]
    pub excise_tax: Option<f64>,
    #[serde(default)]
    pub vat: Option<f64>,
    #[serde(default)]
    pub logistics_cost: Option<f64>,
    #[serde(default)]
    pub shipping_cost: Option<f64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
}

impl SubmittedAnswers {
    /// The value entered for `field`. NaN and infinities count as empty.
    pub fn get(&self, field: CostField) -> Option<f64> {
        let value = match field {
            CostField::LogisticsCost => self.logistics_cost,
            CostField::ShippingCost => self.shipping_cost,
            CostField::CustomsDuty => self.customs_duty,
            CostField::ExciseTax => self.excise_tax,
            CostField::Vat => self.vat,
            CostField::TotalCost => self.total_cost,
        };
        value.filter(|v| v.is_finite())
    }

    /// A copy with every non-finite value replaced by `None`.
    pub fn normalized(&self) -> Self {
        let mut out = Self::default();
        for field in CostField::PRESENTATION_ORDER {
            out.set(field, self.get(field));
        }
        out
    }

    pub fn set(&mut self, field: CostField, value: Option<f64>) {
        let slot = match field {
            CostField::LogisticsCost => &mut self.logistics_cost,
            CostField::ShippingCost => &mut self.shipping_cost,
            CostField::CustomsDuty => &mut self.customs_duty,
            CostField::ExciseTax => &mut self.excise_tax,
            CostField::Vat => &mut self.vat,
            CostField::TotalCost => &mut self.total_cost,
        };
        *slot = value;
    }

    /// Fields that were left empty, in presentation order.
    pub fn missing_fields(&self) -> Vec<CostField> {
        CostField::PRESENTATION_ORDER
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// Returns true if all six fields carry a value.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

impl From<AnswerKey> for SubmittedAnswers {
    fn from(key: AnswerKey) -> Self {
        Self {
            customs_duty: Some(key.customs_duty),
            excise_tax: Some(key.excise_tax),
            vat: Some(key.vat),
            logistics_cost: Some(key.logistics_cost),
            shipping_cost: Some(key.shipping_cost),
            total_cost: Some(key.total_cost),
        }
    }
}

/// A recorded submission: the latest answers and score for one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub student_id: StudentId,
    pub invoice_number: InvoiceNumber,
    pub answers: SubmittedAnswers,
    /// Percentage score in [0, 100].
    pub score: f64,
    pub submitted_at: DateTime<Utc>,
}
