//! Environment-based configuration.

use crate::error::{OrchestratorError, Result};
use std::env;
use std::path::PathBuf;

const DEFAULT_ACCOUNTS_FILE: &str = "data/accounts.json";
const DEFAULT_TRANSFERS_FILE: &str = "data/transfers.csv";

/// Runtime configuration, read once at startup.
///
/// `LEDGER_API_URL` and `LEDGER_API_KEY` are required; the data file paths
/// fall back to the `data/` defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub accounts_file: PathBuf,
    pub transfers_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            api_url: require("LEDGER_API_URL")?,
            api_key: require("LEDGER_API_KEY")?,
            accounts_file: env::var("ACCOUNTS_FILE")
                .unwrap_or_else(|_| DEFAULT_ACCOUNTS_FILE.to_string())
                .into(),
            transfers_file: env::var("TRANSFERS_FILE")
                .unwrap_or_else(|_| DEFAULT_TRANSFERS_FILE.to_string())
                .into(),
        })
    }
}

fn require(name: &'static str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(OrchestratorError::MissingConfig(name)),
    }
}
