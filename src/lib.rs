//! # Remit Orchestrator
//!
//! A batch payment-orchestration client. Given a set of funding accounts
//! and a list of pending transfer instructions, it resolves each
//! instruction against a remote ledger platform (reusing or creating the
//! entity, currency wallet, and destination beneficiary), submits the
//! transfer, locks a pricing quote, and finalizes it for settlement.
//!
//! ## Design Principles
//!
//! - **Idempotent batches**: the instruction `reference` is the sole
//!   idempotency key; re-running a batch never double-submits a transfer
//! - **Read-then-create upserts**: wallets and beneficiaries are looked up
//!   before creation, so at most one exists per (entity, currency)
//! - **Two failure boundaries**: per-item errors skip the item and the
//!   batch continues; setup errors abort the whole run with an empty result
//! - **Sequential execution**: items run strictly in input order because
//!   the upserts are unsafe to interleave for the same entity

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod model;
pub mod resolver;
pub mod source;
pub mod verify;

pub use batch::{BatchOrchestrator, ItemOutcome, TransferItemController};
pub use client::GraphQlClient;
pub use config::Config;
pub use error::{OrchestratorError, Result};
pub use executor::TransferExecutor;
pub use ledger::LedgerService;
pub use model::{
    Corridor, FundingAccount, PendingInstruction, RemoteBeneficiary, RemoteEntity, RemoteTransfer,
    RemoteWallet, TransferQuote, UserAccount,
};
pub use resolver::CorridorResolver;
pub use verify::{FieldVerifier, RequirementsVerifier, Route, VerificationReport};
