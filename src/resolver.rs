//! Corridor resolution: entity, wallet, and beneficiary upsert.
//!
//! All three resolutions follow the same read-then-create pattern: reuse an
//! existing remote record when one matches the key, create it otherwise.
//! This ordering is what enforces the at-most-one-wallet and
//! at-most-one-beneficiary invariants, so callers must not run two
//! resolutions for the same entity concurrently.

use crate::error::{OrchestratorError, Result};
use crate::ledger::LedgerService;
use crate::model::{
    BeneficiaryFields, Corridor, EntityFields, FundingAccount, PendingInstruction,
};
use crate::verify::FieldVerifier;
use log::{debug, info, warn};
use std::time::Duration;

/// Default provisioning poll: five checks spaced 500 ms apart, matching
/// the 2 s settling budget the remote side needs after entity creation.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_POLL_ATTEMPTS: u32 = 5;

/// Resolves or creates the remote identities needed to route one transfer
/// instruction.
pub struct CorridorResolver<'a> {
    ledger: &'a dyn LedgerService,
    verifier: &'a dyn FieldVerifier,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl<'a> CorridorResolver<'a> {
    pub fn new(ledger: &'a dyn LedgerService, verifier: &'a dyn FieldVerifier) -> Self {
        CorridorResolver {
            ledger,
            verifier,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }

    /// Overrides the provisioning poll schedule (tests use a zero interval).
    pub fn with_provisioning_poll(mut self, interval: Duration, attempts: u32) -> Self {
        self.poll_interval = interval;
        self.poll_attempts = attempts;
        self
    }

    /// Returns the id of the user's entity, creating one from the fallback
    /// account's fields if the user owns none.
    ///
    /// After creation the remote side provisions the entity asynchronously;
    /// this polls until the new id becomes visible, then proceeds
    /// regardless once the poll budget is spent.
    pub fn resolve_entity(&self, user_id: &str, fallback: &FundingAccount) -> Result<String> {
        let entities = self.ledger.list_user_entities(user_id)?;
        if let Some(entity) = entities.first() {
            debug!("Reusing entity {} for user {}", entity.id, user_id);
            return Ok(entity.id.clone());
        }

        let fields = EntityFields::from_account(user_id, fallback);
        let entity_id = self.ledger.create_entity(&fields)?.ok_or_else(|| {
            OrchestratorError::EntityCreation {
                user_id: user_id.to_string(),
            }
        })?;
        info!("Created entity {} for user {}", entity_id, user_id);

        self.wait_for_entity(user_id, &entity_id)?;
        Ok(entity_id)
    }

    /// Polls the user's entity list until the created id appears. The
    /// first check is immediate; the interval only separates checks, so
    /// no time is spent sleeping after the last one.
    fn wait_for_entity(&self, user_id: &str, entity_id: &str) -> Result<()> {
        for attempt in 1..=self.poll_attempts {
            if attempt > 1 {
                std::thread::sleep(self.poll_interval);
            }
            let entities = self.ledger.list_user_entities(user_id)?;
            if entities.iter().any(|e| e.id == entity_id) {
                debug!("Entity {} visible after {} poll(s)", entity_id, attempt);
                return Ok(());
            }
        }
        warn!(
            "Entity {} not yet visible after {} polls, continuing",
            entity_id, self.poll_attempts
        );
        Ok(())
    }

    /// Resolves the full corridor for one instruction.
    ///
    /// Creates at most one wallet and at most one beneficiary; existing
    /// remote records are never mutated. A beneficiary is only created
    /// after the matching funding account passes field verification.
    pub fn resolve_corridor(
        &self,
        user_id: &str,
        entity_id: &str,
        accounts: &[FundingAccount],
        instruction: &PendingInstruction,
    ) -> Result<Corridor> {
        let wallet_id = self.resolve_wallet(entity_id, &instruction.from_currency)?;

        let account = accounts
            .iter()
            .find(|a| a.currency == instruction.to_currency)
            .ok_or_else(|| OrchestratorError::CurrencyCoverage {
                currency: instruction.to_currency.clone(),
                reference: instruction.reference.clone(),
            })?;

        let beneficiary_id = self.resolve_beneficiary(user_id, entity_id, account, instruction)?;

        Ok(Corridor {
            user_id: user_id.to_string(),
            entity_id: entity_id.to_string(),
            wallet_id,
            beneficiary_id,
        })
    }

    /// Reuses the entity's wallet for the source currency, creating one if
    /// none exists. The wallet list is re-read on every call so repeated
    /// resolutions never create duplicates.
    fn resolve_wallet(&self, entity_id: &str, currency: &str) -> Result<String> {
        let wallets = self.ledger.list_wallets(entity_id)?;
        if let Some(wallet) = wallets.iter().find(|w| w.currency == currency) {
            debug!("Reusing wallet {} for currency {}", wallet.id, currency);
            return Ok(wallet.id.clone());
        }

        let wallet_id = self
            .ledger
            .create_wallet(entity_id, currency)?
            .ok_or_else(|| OrchestratorError::WalletCreation {
                currency: currency.to_string(),
            })?;
        info!("Created wallet {} for currency {}", wallet_id, currency);
        Ok(wallet_id)
    }

    /// Reuses the entity's beneficiary for the destination currency. When
    /// none exists, the account is verified first; an invalid account
    /// fails the item and no beneficiary is created.
    fn resolve_beneficiary(
        &self,
        user_id: &str,
        entity_id: &str,
        account: &FundingAccount,
        instruction: &PendingInstruction,
    ) -> Result<String> {
        let beneficiaries = self.ledger.list_beneficiaries(entity_id)?;
        if let Some(beneficiary) = beneficiaries
            .iter()
            .find(|b| b.currency == instruction.to_currency)
        {
            debug!(
                "Reusing beneficiary {} for currency {}",
                beneficiary.id, instruction.to_currency
            );
            return Ok(beneficiary.id.clone());
        }

        let report = self.verifier.verify(account)?;
        if !report.valid {
            return Err(OrchestratorError::AccountValidation {
                currency: instruction.to_currency.clone(),
                report,
            });
        }

        let fields = BeneficiaryFields::from_account(user_id, entity_id, account);
        let beneficiary_id = self.ledger.create_beneficiary(&fields)?.ok_or_else(|| {
            OrchestratorError::BeneficiaryCreation {
                currency: instruction.to_currency.clone(),
            }
        })?;
        info!(
            "Created beneficiary {} for currency {}",
            beneficiary_id, instruction.to_currency
        );
        Ok(beneficiary_id)
    }
}
