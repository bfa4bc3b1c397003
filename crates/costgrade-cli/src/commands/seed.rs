//! The `costgrade seed` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};

use costgrade_core::roster::{parse_roster, validate_roster};
use costgrade_store::SqliteStore;

use super::Context;

pub fn execute(ctx: &Context, roster_path: PathBuf) -> Result<()> {
    let roster = parse_roster(&roster_path)?;

    for w in validate_roster(&roster) {
        let prefix = w
            .student_id
            .as_ref()
            .map(|id| format!("[{id}] "))
            .unwrap_or_default();
        eprintln!("{prefix}WARNING: {}", w.message);
    }

    let config = ctx.load_config()?;
    let mut store = SqliteStore::create(&config.database)
        .and_then(|s| s.with_busy_timeout(Duration::from_millis(config.busy_timeout_ms)))
        .context("grading database unavailable")?;
    let stats = store
        .import_roster(&roster)
        .context("failed to load roster")?;

    println!(
        "Loaded {} student(s), {} invoice(s), {} answer key(s) into {}",
        stats.students,
        stats.invoices,
        stats.answer_keys,
        config.database.display()
    );

    Ok(())
}
