//! Batch-level control loop: dedup, pre-flight validation, sequential item
//! execution, and reconciliation.
//!
//! The batch is safe to re-run: instructions whose reference already exists
//! on the remote ledger are filtered out before any call is made, so the
//! same batch never double-submits a transfer.

use crate::error::{OrchestratorError, Result};
use crate::executor::TransferExecutor;
use crate::ledger::LedgerService;
use crate::model::{FundingAccount, PendingInstruction, RemoteTransfer};
use crate::resolver::CorridorResolver;
use crate::verify::FieldVerifier;
use log::{debug, error, info};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Bounded page fetched when deduplicating against existing transfers.
pub const DEDUP_PAGE_LIMIT: usize = 100;

/// Outcome of processing one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The transfer was created and finalized
    Completed { transfer_id: String },
    /// The item failed somewhere in resolution or execution and was
    /// skipped; the batch continued
    NotProcessed { reference: String },
}

impl ItemOutcome {
    /// The transfer id, when the item completed.
    pub fn transfer_id(&self) -> Option<&str> {
        match self {
            ItemOutcome::Completed { transfer_id } => Some(transfer_id),
            ItemOutcome::NotProcessed { .. } => None,
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Completed { transfer_id } => write!(f, "{}", transfer_id),
            ItemOutcome::NotProcessed { reference } => {
                write!(f, "Not processed: {}", reference)
            }
        }
    }
}

/// Failure boundary around one instruction: resolution and execution errors
/// are logged and converted into a [`ItemOutcome::NotProcessed`] outcome so
/// one bad instruction cannot abort the batch.
pub struct TransferItemController<'a> {
    resolver: &'a CorridorResolver<'a>,
    executor: &'a TransferExecutor<'a>,
}

impl<'a> TransferItemController<'a> {
    pub fn new(resolver: &'a CorridorResolver<'a>, executor: &'a TransferExecutor<'a>) -> Self {
        TransferItemController { resolver, executor }
    }

    /// Resolves the corridor and executes the transfer for one instruction.
    pub fn process(
        &self,
        user_id: &str,
        entity_id: &str,
        accounts: &[FundingAccount],
        instruction: &PendingInstruction,
    ) -> ItemOutcome {
        match self.try_process(user_id, entity_id, accounts, instruction) {
            Ok(transfer_id) => ItemOutcome::Completed { transfer_id },
            Err(e) => {
                error!("Reference {}: {}", instruction.reference, e);
                ItemOutcome::NotProcessed {
                    reference: instruction.reference.clone(),
                }
            }
        }
    }

    fn try_process(
        &self,
        user_id: &str,
        entity_id: &str,
        accounts: &[FundingAccount],
        instruction: &PendingInstruction,
    ) -> Result<String> {
        let corridor = self
            .resolver
            .resolve_corridor(user_id, entity_id, accounts, instruction)?;
        self.executor.execute(&corridor, instruction)
    }
}

/// Top-level control loop over one batch run.
pub struct BatchOrchestrator<'a> {
    ledger: &'a dyn LedgerService,
    verifier: &'a dyn FieldVerifier,
    page_limit: usize,
    poll_override: Option<(Duration, u32)>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(ledger: &'a dyn LedgerService, verifier: &'a dyn FieldVerifier) -> Self {
        BatchOrchestrator {
            ledger,
            verifier,
            page_limit: DEDUP_PAGE_LIMIT,
            poll_override: None,
        }
    }

    /// Overrides the entity provisioning poll schedule (tests use a zero
    /// interval).
    pub fn with_provisioning_poll(mut self, interval: Duration, attempts: u32) -> Self {
        self.poll_override = Some((interval, attempts));
        self
    }

    /// Runs the batch and returns the remote records of the transfers
    /// submitted in this run.
    ///
    /// This is the batch-level failure boundary: any error before or
    /// outside per-item processing is fatal, logged here, and yields an
    /// empty result rather than propagating.
    pub fn run(
        &self,
        accounts: &[FundingAccount],
        instructions: &[PendingInstruction],
    ) -> Vec<RemoteTransfer> {
        match self.run_batch(accounts, instructions) {
            Ok(transfers) => transfers,
            Err(e) => {
                error!("Unable to process transfers: {}", e);
                Vec::new()
            }
        }
    }

    fn run_batch(
        &self,
        accounts: &[FundingAccount],
        instructions: &[PendingInstruction],
    ) -> Result<Vec<RemoteTransfer>> {
        // Load: first user acts on behalf of the whole run.
        let users = self.ledger.list_users()?;
        let user = users.first().ok_or(OrchestratorError::NoUsers)?;
        debug!("Acting as user {}", user.id);

        // Bootstrap: single entity per run, created from the first funding
        // account if the user owns none.
        let template = accounts.first().ok_or(OrchestratorError::NoAccounts)?;
        let mut resolver = CorridorResolver::new(self.ledger, self.verifier);
        if let Some((interval, attempts)) = self.poll_override {
            resolver = resolver.with_provisioning_poll(interval, attempts);
        }
        let entity_id = resolver.resolve_entity(&user.id, template)?;

        // Dedup: the reference is the idempotency key.
        let existing = self.ledger.list_transfers(self.page_limit)?;
        let remaining: Vec<&PendingInstruction> = instructions
            .iter()
            .filter(|instruction| {
                let submitted = existing
                    .iter()
                    .any(|t| t.reference.as_deref() == Some(instruction.reference.as_str()));
                if submitted {
                    info!(
                        "Reference {} already submitted, skipping",
                        instruction.reference
                    );
                }
                !submitted
            })
            .collect();

        if remaining.is_empty() {
            info!("No transfers to process");
            return Ok(Vec::new());
        }

        // Pre-flight: every currency in the batch must be covered by a
        // funding account before any transfer is attempted.
        for instruction in &remaining {
            for currency in [&instruction.from_currency, &instruction.to_currency] {
                if !accounts.iter().any(|a| &a.currency == currency) {
                    return Err(OrchestratorError::CurrencyCoverage {
                        currency: currency.clone(),
                        reference: instruction.reference.clone(),
                    });
                }
            }
        }

        // Execute strictly in input order: corridor resolution performs
        // read-then-create upserts that are unsafe to interleave for the
        // same entity.
        let executor = TransferExecutor::new(self.ledger);
        let controller = TransferItemController::new(&resolver, &executor);
        let mut outcomes = Vec::with_capacity(remaining.len());
        for instruction in &remaining {
            let outcome = controller.process(&user.id, &entity_id, accounts, instruction);
            info!("Reference {}: {}", instruction.reference, outcome);
            outcomes.push(outcome);
        }

        // Reconcile: re-fetch and keep the transfers submitted in this run.
        let submitted: HashSet<&str> = outcomes
            .iter()
            .filter_map(ItemOutcome::transfer_id)
            .collect();
        let current = self.ledger.list_transfers(0)?;
        let result: Vec<RemoteTransfer> = current
            .into_iter()
            .filter(|t| submitted.contains(t.id.as_str()))
            .collect();

        info!(
            "Batch complete: {} of {} instruction(s) processed",
            result.len(),
            outcomes.len()
        );
        Ok(result)
    }
}
