//! The `costgrade student` command.

use anyhow::Result;

use costgrade_core::grader::FIELD_COUNT;
use costgrade_core::traits::AnswerStore;

use super::{require_student, Context};

pub fn execute(ctx: &Context, raw_id: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let student = require_student(&store, raw_id)?;
    let invoices = store.invoices_for(&student.student_id)?;

    println!("Student found.");
    println!("  Name:          {}", student.name);
    println!("  Student no:    {}", student.student_id);
    println!(
        "  Registered:    {}",
        student.registration_date.format("%Y-%m-%d")
    );
    println!("  Invoices:      {}", invoices.len());
    println!("  Per invoice:   {FIELD_COUNT} questions");

    Ok(())
}
