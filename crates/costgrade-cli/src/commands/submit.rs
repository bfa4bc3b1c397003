//! The `costgrade submit` command.

use anyhow::Result;

use costgrade_core::feedback::{details, headline};
use costgrade_core::model::{InvoiceNumber, SubmittedAnswers};
use costgrade_core::workflow::{submit, SubmitOutcome};

use super::{require_student, Context};
use crate::OutputFormat;

/// Exit code when the submission was not graded or not saved.
const NOT_RECORDED_EXIT: i32 = 2;

pub fn execute(
    ctx: &Context,
    raw_id: &str,
    invoice_number: InvoiceNumber,
    answers: SubmittedAnswers,
    require_all: bool,
    format: OutputFormat,
) -> Result<()> {
    let answers = answers.normalized();
    if require_all && !answers.is_complete() {
        let missing: Vec<&str> = answers
            .missing_fields()
            .into_iter()
            .map(|f| f.key())
            .collect();
        anyhow::bail!("please fill in all fields (missing: {})", missing.join(", "));
    }

    let store = ctx.open_store()?;
    let student = require_student(&store, raw_id)?;

    let outcome = submit(
        &store,
        &store,
        &student.student_id,
        invoice_number,
        &answers,
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print_text(&outcome),
    }

    if !outcome.is_recorded() {
        std::process::exit(NOT_RECORDED_EXIT);
    }

    Ok(())
}

fn print_text(outcome: &SubmitOutcome) {
    match outcome.report() {
        Some(report) => {
            println!("{}", headline(report));
            println!("\nDetails:");
            println!("{}", details(report));
            println!();
        }
        None => println!("Score: {:.0}%", outcome.score()),
    }
    println!("{}", outcome.message());
}
