//! GraphQL-over-HTTP client for the remote ledger platform.
//!
//! Sends `{query, variables}` POST requests with bearer authentication and
//! unwraps the `{data, errors}` envelope. Server-reported errors map to
//! [`OrchestratorError::RemoteCall`]; the orchestrator does not distinguish
//! failures by transport status.

use crate::error::{OrchestratorError, Result};
use crate::ledger::LedgerService;
use crate::model::{
    BeneficiaryFields, Corridor, EntityFields, EntityWallets, RemoteBeneficiary, RemoteEntity,
    RemoteTransfer, RemoteWallet, TransferQuote, UserAccount,
};
use crate::verify::{FieldRequirement, Route};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USERS_QUERY: &str = "\
query organizationUsers($listFilter: ListFilter) {
  organizationUsers(listFilter: $listFilter) {
    id email first_name last_name
  }
}";

const USER_ENTITIES_QUERY: &str = "\
query userEntities($user_id: UUID!, $listFilter: ListFilter) {
  userEntities(user_id: $user_id, listFilter: $listFilter) {
    id state
  }
}";

const ENTITY_WALLETS_QUERY: &str = "\
query entityWallets($entity_id: UUID!) {
  entityWallets(entity_id: $entity_id) {
    id currency balance available_balance
  }
}";

const ENTITY_BENEFICIARIES_QUERY: &str = "\
query entityBeneficiaries($entity_id: UUID!, $listFilter: ListFilter) {
  entityBeneficiaries(entity_id: $entity_id, listFilter: $listFilter) {
    id currency account_number bank_country
  }
}";

const TRANSFERS_QUERY: &str = "\
query transfers($listFilter: ListFilter) {
  transfers(listFilter: $listFilter) {
    id state reference fee rate
    source_amount source_currency
    destination_amount destination_currency
    purpose_of_payment created_date
  }
}";

const ORG_ENTITIES_QUERY: &str = "\
query organizationEntities($listFilter: ListFilter) {
  organizationEntities(listFilter: $listFilter) {
    id state
  }
}";

const ORG_WALLETS_QUERY: &str = "\
query organizationEntityWallets($listFilter: ListFilter) {
  organizationEntityWallets(listFilter: $listFilter) {
    entity_id entity_name
    wallets { id currency balance available_balance }
  }
}";

const ORG_BENEFICIARIES_QUERY: &str = "\
query organizationBeneficiaries($listFilter: ListFilter) {
  organizationBeneficiaries(listFilter: $listFilter) {
    id currency account_number bank_country
  }
}";

const REQUIRED_FIELDS_QUERY: &str = "\
query beneficiaryRequiredFields($bank_country: ISO3166_1!, $currency: ISO4217!, $beneficiary_country: ISO3166_1) {
  beneficiaryRequiredFields(bank_country: $bank_country, currency: $currency, beneficiary_country: $beneficiary_country) {
    personal { variable regex example }
  }
}";

const CREATE_ENTITY_MUTATION: &str = "\
mutation createPersonalEntity($user_id: UUID!, $email: Email!, $first_name: String!, $last_name: String!, $address1: String!, $city: String, $state_province_region: String, $postal_code: PostalCode, $country: ISO3166_1!, $birth_date: DateTime!, $accept_terms_and_conditions: Boolean!) {
  createPersonalEntity(user_id: $user_id, email: $email, first_name: $first_name, last_name: $last_name, address1: $address1, city: $city, state_province_region: $state_province_region, postal_code: $postal_code, country: $country, birth_date: $birth_date, accept_terms_and_conditions: $accept_terms_and_conditions)
}";

const CREATE_WALLET_MUTATION: &str = "\
mutation createWallet($entity_id: UUID!, $currency: ISO4217!) {
  createWallet(entity_id: $entity_id, currency: $currency)
}";

const CREATE_BENEFICIARY_MUTATION: &str = "\
mutation createPersonalBeneficiary($user_id: UUID!, $entity_id: UUID!, $email: Email!, $first_name: String!, $last_name: String!, $address1: String, $city: String, $state_province_region: String, $postal_code: PostalCode, $country: ISO3166_1!, $swift_bic: SwiftBic, $account_number: BankAccountNumber, $routing_code: BankRoutingCode, $currency: ISO4217!, $bank_name: String, $bank_address1: String, $bank_city: String, $bank_state_province_region: String, $bank_postal_code: PostalCode, $bank_country: ISO3166_1!) {
  createPersonalBeneficiary(user_id: $user_id, entity_id: $entity_id, email: $email, first_name: $first_name, last_name: $last_name, address1: $address1, city: $city, state_province_region: $state_province_region, postal_code: $postal_code, country: $country, swift_bic: $swift_bic, account_number: $account_number, routing_code: $routing_code, currency: $currency, bank_name: $bank_name, bank_address1: $bank_address1, bank_city: $bank_city, bank_state_province_region: $bank_state_province_region, bank_postal_code: $bank_postal_code, bank_country: $bank_country)
}";

const CREATE_TRANSFER_MUTATION: &str = "\
mutation createTransfer($user_id: UUID!, $entity_id: UUID!, $wallet_id: UUID!, $beneficiary_id: UUID!, $source_amount: String, $purpose_of_payment: String!, $reference: String) {
  createTransfer(user_id: $user_id, entity_id: $entity_id, wallet_id: $wallet_id, beneficiary_id: $beneficiary_id, source_amount: $source_amount, purpose_of_payment: $purpose_of_payment, reference: $reference)
}";

const QUOTE_TRANSFER_MUTATION: &str = "\
mutation getTransferQuote($transfer_id: UUID!) {
  getTransferQuote(transfer_id: $transfer_id) {
    rate inverted_rate
    source_amount destination_amount
    source_currency destination_currency
    fee fee_usd
  }
}";

const FINALIZE_TRANSFER_MUTATION: &str = "\
mutation finalizeTransfer($transfer_id: UUID!) {
  finalizeTransfer(transfer_id: $transfer_id)
}";

/// Wire request body.
#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

/// Wire response envelope.
#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// Required-fields payload: rules split by beneficiary kind. Only personal
/// beneficiaries are created here.
#[derive(Deserialize)]
struct RequiredFieldsPayload {
    #[serde(default)]
    personal: Vec<FieldRequirement>,
}

/// Blocking GraphQL client implementing [`LedgerService`].
pub struct GraphQlClient {
    http: reqwest::blocking::Client,
    url: String,
    api_key: String,
}

impl GraphQlClient {
    /// Builds a client for the given endpoint and bearer token.
    pub fn new(url: &str, api_key: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(GraphQlClient {
            http,
            url: url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Executes one operation and deserializes `data.<operation>`.
    fn call<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: Value,
    ) -> Result<R> {
        debug!("calling remote operation {}", operation);
        let body = GraphQlRequest { query, variables };
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| OrchestratorError::RemoteCall {
                operation,
                message: e.to_string(),
            })?;
        let text = response
            .text()
            .map_err(|e| OrchestratorError::RemoteCall {
                operation,
                message: e.to_string(),
            })?;
        unwrap_envelope(operation, &text)
    }

    fn list_filter(limit: usize) -> Value {
        json!({ "listFilter": { "limit": limit, "offset": 0 } })
    }
}

/// Parses a raw response body and extracts the named operation's payload.
fn unwrap_envelope<R: DeserializeOwned>(operation: &'static str, body: &str) -> Result<R> {
    let envelope: GraphQlResponse =
        serde_json::from_str(body).map_err(|e| OrchestratorError::RemoteCall {
            operation,
            message: format!("malformed response: {}", e),
        })?;

    if let Some(errors) = envelope.errors {
        let message = errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(OrchestratorError::RemoteCall { operation, message });
    }

    let payload = envelope
        .data
        .and_then(|mut data| data.get_mut(operation).map(Value::take))
        .unwrap_or(Value::Null);

    serde_json::from_value(payload).map_err(|e| OrchestratorError::RemoteCall {
        operation,
        message: format!("unexpected payload shape: {}", e),
    })
}

impl LedgerService for GraphQlClient {
    fn list_users(&self) -> Result<Vec<UserAccount>> {
        self.call("organizationUsers", USERS_QUERY, Self::list_filter(0))
    }

    fn list_user_entities(&self, user_id: &str) -> Result<Vec<RemoteEntity>> {
        let mut variables = Self::list_filter(0);
        variables["user_id"] = json!(user_id);
        self.call("userEntities", USER_ENTITIES_QUERY, variables)
    }

    fn create_entity(&self, fields: &EntityFields) -> Result<Option<String>> {
        let variables = serde_json::to_value(fields)?;
        self.call("createPersonalEntity", CREATE_ENTITY_MUTATION, variables)
    }

    fn list_wallets(&self, entity_id: &str) -> Result<Vec<RemoteWallet>> {
        self.call(
            "entityWallets",
            ENTITY_WALLETS_QUERY,
            json!({ "entity_id": entity_id }),
        )
    }

    fn create_wallet(&self, entity_id: &str, currency: &str) -> Result<Option<String>> {
        self.call(
            "createWallet",
            CREATE_WALLET_MUTATION,
            json!({ "entity_id": entity_id, "currency": currency }),
        )
    }

    fn list_beneficiaries(&self, entity_id: &str) -> Result<Vec<RemoteBeneficiary>> {
        let mut variables = Self::list_filter(0);
        variables["entity_id"] = json!(entity_id);
        self.call("entityBeneficiaries", ENTITY_BENEFICIARIES_QUERY, variables)
    }

    fn create_beneficiary(&self, fields: &BeneficiaryFields) -> Result<Option<String>> {
        let variables = serde_json::to_value(fields)?;
        self.call(
            "createPersonalBeneficiary",
            CREATE_BENEFICIARY_MUTATION,
            variables,
        )
    }

    fn create_transfer(
        &self,
        corridor: &Corridor,
        amount: &str,
        purpose: &str,
        reference: &str,
    ) -> Result<Option<String>> {
        let variables = json!({
            "user_id": corridor.user_id,
            "entity_id": corridor.entity_id,
            "wallet_id": corridor.wallet_id,
            "beneficiary_id": corridor.beneficiary_id,
            "source_amount": amount,
            "purpose_of_payment": purpose,
            "reference": reference,
        });
        self.call("createTransfer", CREATE_TRANSFER_MUTATION, variables)
    }

    fn quote_transfer(&self, transfer_id: &str) -> Result<TransferQuote> {
        self.call(
            "getTransferQuote",
            QUOTE_TRANSFER_MUTATION,
            json!({ "transfer_id": transfer_id }),
        )
    }

    fn finalize_transfer(&self, transfer_id: &str) -> Result<()> {
        let _: Value = self.call(
            "finalizeTransfer",
            FINALIZE_TRANSFER_MUTATION,
            json!({ "transfer_id": transfer_id }),
        )?;
        Ok(())
    }

    fn list_transfers(&self, limit: usize) -> Result<Vec<RemoteTransfer>> {
        self.call("transfers", TRANSFERS_QUERY, Self::list_filter(limit))
    }

    fn beneficiary_required_fields(&self, route: &Route) -> Result<Vec<FieldRequirement>> {
        let variables = json!({
            "bank_country": route.bank_country,
            "currency": route.currency,
            "beneficiary_country": route.beneficiary_country,
        });
        let payload: RequiredFieldsPayload = self.call(
            "beneficiaryRequiredFields",
            REQUIRED_FIELDS_QUERY,
            variables,
        )?;
        Ok(payload.personal)
    }

    fn list_org_entities(&self, limit: usize) -> Result<Vec<RemoteEntity>> {
        self.call(
            "organizationEntities",
            ORG_ENTITIES_QUERY,
            Self::list_filter(limit),
        )
    }

    fn list_org_wallets(&self, limit: usize) -> Result<Vec<EntityWallets>> {
        self.call(
            "organizationEntityWallets",
            ORG_WALLETS_QUERY,
            Self::list_filter(limit),
        )
    }

    fn list_org_beneficiaries(&self, limit: usize) -> Result<Vec<RemoteBeneficiary>> {
        self.call(
            "organizationBeneficiaries",
            ORG_BENEFICIARIES_QUERY,
            Self::list_filter(limit),
        )
    }
}
