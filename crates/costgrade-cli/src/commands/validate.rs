//! The `costgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use costgrade_core::roster::{parse_roster, validate_roster};

pub fn execute(roster_path: PathBuf) -> Result<()> {
    let roster = parse_roster(&roster_path)?;

    println!(
        "Roster: {} student(s), {} invoice(s), {} answer key(s)",
        roster.students.len(),
        roster.invoice_count(),
        roster.answer_key_count()
    );

    let warnings = validate_roster(&roster);
    for w in &warnings {
        let prefix = w
            .student_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Roster is valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
