//! Transfer execution: submit, quote, finalize.

use crate::error::{OrchestratorError, Result};
use crate::ledger::LedgerService;
use crate::model::{Corridor, PendingInstruction};
use log::info;

/// Drives one resolved corridor through the remote transfer lifecycle.
pub struct TransferExecutor<'a> {
    ledger: &'a dyn LedgerService,
}

impl<'a> TransferExecutor<'a> {
    pub fn new(ledger: &'a dyn LedgerService) -> Self {
        TransferExecutor { ledger }
    }

    /// Creates the transfer, locks a quote, and finalizes it for
    /// settlement. The quote is informational and never gates
    /// finalization, but each of the three calls may fail independently;
    /// a failure after creation leaves the transfer pending on the remote
    /// side, with no automatic retry.
    pub fn execute(
        &self,
        corridor: &Corridor,
        instruction: &PendingInstruction,
    ) -> Result<String> {
        let transfer_id = self
            .ledger
            .create_transfer(
                corridor,
                &instruction.amount.to_string(),
                &instruction.purpose,
                &instruction.reference,
            )?
            .ok_or_else(|| OrchestratorError::TransferCreation {
                reference: instruction.reference.clone(),
            })?;
        info!(
            "Created transfer {} ({} {} -> {}, reference {})",
            transfer_id,
            instruction.amount,
            instruction.from_currency,
            instruction.to_currency,
            instruction.reference
        );

        let quote = self.ledger.quote_transfer(&transfer_id)?;
        info!(
            "Quote for transfer {}: rate {} fee {} ({} {} -> {} {})",
            transfer_id,
            quote.rate,
            quote.fee,
            quote.source_amount,
            quote.source_currency,
            quote.destination_amount,
            quote.destination_currency
        );

        self.ledger.finalize_transfer(&transfer_id)?;
        info!("Finalized transfer {}", transfer_id);

        Ok(transfer_id)
    }
}
