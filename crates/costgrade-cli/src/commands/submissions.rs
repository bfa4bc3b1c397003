//! The `costgrade submissions` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use costgrade_core::grader::FIELD_COUNT;
use costgrade_core::summary::summarize;
use costgrade_core::traits::{AnswerStore, SubmissionStore};

use super::{require_student, Context};

pub fn execute(ctx: &Context, raw_id: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let student = require_student(&store, raw_id)?;
    let invoices = store.invoices_for(&student.student_id)?;
    let submissions = store.submissions_for(&student.student_id)?;

    println!("Submissions for {} ({})", student.name, student.student_id);

    if submissions.is_empty() {
        println!("No submissions recorded yet.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Invoice", "Score", "Answered", "Submitted at"]);
        for s in &submissions {
            let answered = FIELD_COUNT - s.answers.missing_fields().len();
            table.add_row(vec![
                Cell::new(format!("#{}", s.invoice_number)),
                Cell::new(format!("{:.2}%", s.score)),
                Cell::new(format!("{answered}/{FIELD_COUNT}")),
                Cell::new(s.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")),
            ]);
        }
        println!("{table}");
    }

    let summary = summarize(&invoices, &submissions);
    println!(
        "\nSubmitted {}/{} invoice(s) ({:.0}%), mean score {:.2}%, best {:.2}%, {} perfect",
        summary.submitted_count,
        summary.invoice_count,
        summary.completion_rate() * 100.0,
        summary.mean_score,
        summary.best_score,
        summary.perfect_count
    );

    Ok(())
}
