//! Store configuration and factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use costgrade_core::error::StoreResult;

use crate::sqlite::SqliteStore;

/// Environment variable that overrides the configured database path.
pub const DATABASE_ENV: &str = "COSTGRADE_DATABASE";

/// Top-level costgrade configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostgradeConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// How long a write waits for a competing writer, in milliseconds.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_database() -> PathBuf {
    PathBuf::from("data/database/logistics.db")
}
fn default_busy_timeout() -> u64 {
    5000
}

impl Default for CostgradeConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!(
            "{}{}{}",
            &result[..start],
            value,
            &result[start + end + 1..]
        );
        from = start + value.len();
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `costgrade.toml` in the current directory
/// 2. `~/.config/costgrade/config.toml`
///
/// Environment variable override: `COSTGRADE_DATABASE`.
pub fn load_config() -> Result<CostgradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CostgradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("costgrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            toml::from_str::<CostgradeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CostgradeConfig::default(),
    };

    if let Ok(database) = std::env::var(DATABASE_ENV) {
        if !database.is_empty() {
            config.database = PathBuf::from(database);
        }
    }

    config.database = PathBuf::from(resolve_env_vars(&config.database.to_string_lossy()));

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("costgrade"))
}

/// Open the configured database with its busy timeout applied.
pub fn open_store(config: &CostgradeConfig) -> StoreResult<SqliteStore> {
    SqliteStore::open(&config.database)?
        .with_busy_timeout(Duration::from_millis(config.busy_timeout_ms))
}
