//! Error types for the transfer orchestrator.

use crate::verify::VerificationReport;
use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Errors that can occur while orchestrating a batch.
///
/// Only two catch boundaries exist: the batch-level boundary in
/// [`crate::batch::BatchOrchestrator::run`] (fatal, empty result) and the
/// per-item boundary in [`crate::batch::TransferItemController::process`]
/// (item skipped, batch continues). No error is retried automatically.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error in the instructions file
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error while reading accounts or writing results
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client construction or transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote ledger call failed; carries the server-reported payload.
    /// All remote failures look alike to the core regardless of cause.
    #[error("remote call '{operation}' failed: {message}")]
    RemoteCall {
        operation: &'static str,
        message: String,
    },

    /// Entity creation returned no id
    #[error("unable to create entity for user {user_id}")]
    EntityCreation { user_id: String },

    /// Wallet creation returned no id
    #[error("unable to create wallet for source currency: {currency}")]
    WalletCreation { currency: String },

    /// Beneficiary creation returned no id
    #[error("unable to create beneficiary for destination currency: {currency}")]
    BeneficiaryCreation { currency: String },

    /// Field verification rejected the funding account for a destination
    /// currency; carries the per-field report for diagnostics
    #[error("invalid account details for destination currency: {currency}")]
    AccountValidation {
        currency: String,
        report: VerificationReport,
    },

    /// Transfer creation returned no id
    #[error("unable to create transfer for reference: {reference}")]
    TransferCreation { reference: String },

    /// The remote ledger reported no users to act on behalf of
    #[error("no users exist on the remote ledger")]
    NoUsers,

    /// The data source supplied no funding accounts
    #[error("no funding accounts supplied by the data source")]
    NoAccounts,

    /// An instruction names a currency no funding account covers.
    /// Raised during pre-flight for the whole batch, before any transfer
    /// is attempted.
    #[error("no funding account covers currency {currency} (reference {reference})")]
    CurrencyCoverage { currency: String, reference: String },

    /// Required-field rules could not be retrieved for a route
    #[error("unable to find required fields for route {bank_country}/{country}/{currency}")]
    Requirements {
        bank_country: String,
        country: String,
        currency: String,
    },

    /// A required environment variable is unset
    #[error("missing environment variable: {0}")]
    MissingConfig(&'static str),

    /// Missing or unknown command argument
    #[error("missing or unknown command. Usage: remit-orchestrator <transfer|verify|requirements|data>")]
    MissingArgument,
}
