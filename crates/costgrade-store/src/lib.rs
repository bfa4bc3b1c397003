//! costgrade-store — SQLite persistence for costgrade.
//!
//! Implements the `AnswerStore` and `SubmissionStore` traits over a single
//! SQLite database, plus the TOML configuration that locates it.

pub mod config;
pub mod sqlite;

pub use config::{load_config, load_config_from, open_store, CostgradeConfig};
pub use sqlite::{ImportStats, SqliteStore};
