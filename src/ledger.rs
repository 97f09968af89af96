//! Remote ledger service contract.
//!
//! The orchestrator depends only on these request/response operations, not
//! on the transport behind them. All calls are blocking request/response;
//! any of them may fail with
//! [`OrchestratorError::RemoteCall`](crate::error::OrchestratorError)
//! carrying the server-reported payload.

use crate::error::Result;
use crate::model::{
    BeneficiaryFields, Corridor, EntityFields, EntityWallets, RemoteBeneficiary, RemoteEntity,
    RemoteTransfer, RemoteWallet, TransferQuote, UserAccount,
};
use crate::verify::{FieldRequirement, Route};

/// Query and mutation surface of the remote ledger platform.
///
/// Creation calls return `Ok(None)` when the server accepts the request but
/// yields no id; callers treat that the same as a refusal.
pub trait LedgerService {
    /// Lists the user accounts visible to the caller.
    fn list_users(&self) -> Result<Vec<UserAccount>>;

    /// Lists the entities owned by a user.
    fn list_user_entities(&self, user_id: &str) -> Result<Vec<RemoteEntity>>;

    /// Creates a personal entity and returns its id.
    fn create_entity(&self, fields: &EntityFields) -> Result<Option<String>>;

    /// Lists the wallets held by an entity.
    fn list_wallets(&self, entity_id: &str) -> Result<Vec<RemoteWallet>>;

    /// Creates a wallet denominated in `currency` for an entity.
    fn create_wallet(&self, entity_id: &str, currency: &str) -> Result<Option<String>>;

    /// Lists the beneficiaries owned by an entity.
    fn list_beneficiaries(&self, entity_id: &str) -> Result<Vec<RemoteBeneficiary>>;

    /// Creates a personal beneficiary and returns its id.
    fn create_beneficiary(&self, fields: &BeneficiaryFields) -> Result<Option<String>>;

    /// Submits a transfer along a resolved corridor.
    fn create_transfer(
        &self,
        corridor: &Corridor,
        amount: &str,
        purpose: &str,
        reference: &str,
    ) -> Result<Option<String>>;

    /// Locks a pricing quote for a created transfer.
    fn quote_transfer(&self, transfer_id: &str) -> Result<TransferQuote>;

    /// Finalizes a transfer for downstream settlement.
    fn finalize_transfer(&self, transfer_id: &str) -> Result<()>;

    /// Lists existing transfers. A `limit` of zero requests the server's
    /// unbounded default page.
    fn list_transfers(&self, limit: usize) -> Result<Vec<RemoteTransfer>>;

    /// Fetches the personal required-field rules for a payout route.
    fn beneficiary_required_fields(&self, route: &Route) -> Result<Vec<FieldRequirement>>;

    /// Lists entities across the whole organization.
    fn list_org_entities(&self, limit: usize) -> Result<Vec<RemoteEntity>>;

    /// Lists every entity's wallets across the whole organization.
    fn list_org_wallets(&self, limit: usize) -> Result<Vec<EntityWallets>>;

    /// Lists beneficiaries across the whole organization.
    fn list_org_beneficiaries(&self, limit: usize) -> Result<Vec<RemoteBeneficiary>>;
}
