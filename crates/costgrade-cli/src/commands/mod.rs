pub mod init;
pub mod invoices;
pub mod seed;
pub mod student;
pub mod submissions;
pub mod submit;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use costgrade_core::model::{Student, StudentId};
use costgrade_core::traits::AnswerStore;
use costgrade_store::{load_config_from, open_store, CostgradeConfig, SqliteStore};

/// Global options shared by every command.
pub struct Context {
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
}

impl Context {
    /// Resolve the configuration, applying the `--database` override.
    pub fn load_config(&self) -> Result<CostgradeConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(db) = &self.database {
            config.database = db.clone();
        }
        Ok(config)
    }

    /// Open the configured grading database.
    pub fn open_store(&self) -> Result<SqliteStore> {
        let config = self.load_config()?;
        open_store(&config).context("grading database unavailable")
    }
}

pub fn parse_student_id(raw: &str) -> Result<StudentId> {
    raw.parse().map_err(|e: String| anyhow::anyhow!("{e}"))
}

/// Look up a student, failing with a "not found" error if absent.
pub fn require_student(store: &SqliteStore, raw_id: &str) -> Result<Student> {
    let id = parse_student_id(raw_id)?;
    store
        .student(&id)?
        .with_context(|| format!("student not found: {id}. Please check the number."))
}
