//! Data model: local inputs, remote ledger records, and creation payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fixed placeholder birth date used when creating an entity from a funding
/// account template. The ledger requires one for personal entities; the data
/// source does not carry it.
pub const PLACEHOLDER_BIRTH_DATE: &str = "1980-01-01T00:00:00.000Z";

/// A local definition of a bank account usable as a funding template or
/// payout destination. Supplied by the data source as a JSON array and
/// immutable for the run.
///
/// All fields default to empty so sparsely-populated accounts load; field
/// verification reports anything a route requires but the account lacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingAccount {
    pub currency: String,
    pub country: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address1: String,
    pub city: String,
    pub state_province_region: String,
    pub postal_code: String,
    pub account_number: String,
    pub routing_code: String,
    pub swift_bic: String,
    pub bank_name: String,
    pub bank_address1: String,
    pub bank_city: String,
    pub bank_state_province_region: String,
    pub bank_postal_code: String,
    pub bank_country: String,
}

impl FundingAccount {
    /// Looks up a field by its wire variable name, as named in
    /// required-field rules. Returns `None` for variables this account
    /// type does not carry.
    pub fn field(&self, variable: &str) -> Option<&str> {
        let value = match variable {
            "currency" => &self.currency,
            "country" => &self.country,
            "first_name" => &self.first_name,
            "last_name" => &self.last_name,
            "email" => &self.email,
            "address1" => &self.address1,
            "city" => &self.city,
            "state_province_region" => &self.state_province_region,
            "postal_code" => &self.postal_code,
            "account_number" => &self.account_number,
            "routing_code" => &self.routing_code,
            "swift_bic" => &self.swift_bic,
            "bank_name" => &self.bank_name,
            "bank_address1" => &self.bank_address1,
            "bank_city" => &self.bank_city,
            "bank_state_province_region" => &self.bank_state_province_region,
            "bank_postal_code" => &self.bank_postal_code,
            "bank_country" => &self.bank_country,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// Raw instruction row as read from the transfers CSV.
///
/// Headers are camelCase on the wire; amounts arrive as strings and are
/// validated during parsing.
#[derive(Debug, Deserialize)]
pub struct InstructionRecord {
    #[serde(rename = "fromCurrency")]
    pub from_currency: String,

    #[serde(rename = "toCurrency")]
    pub to_currency: String,

    pub amount: String,
    pub purpose: String,
    pub reference: String,
}

impl InstructionRecord {
    /// Parses the raw CSV row into a validated instruction.
    ///
    /// Returns `None` if the amount is not a decimal number or the
    /// reference is empty (an empty reference cannot serve as an
    /// idempotency key).
    pub fn parse(&self) -> Option<PendingInstruction> {
        let amount = Decimal::from_str(self.amount.trim()).ok()?;
        let reference = self.reference.trim();
        if reference.is_empty() {
            return None;
        }
        Some(PendingInstruction {
            from_currency: self.from_currency.trim().to_uppercase(),
            to_currency: self.to_currency.trim().to_uppercase(),
            amount,
            purpose: self.purpose.trim().to_string(),
            reference: reference.to_string(),
        })
    }
}

/// One requested money movement, validated and ready for orchestration.
///
/// `reference` is the sole idempotency key: an instruction is considered
/// already processed iff a remote transfer with the same reference exists.
#[derive(Debug, Clone)]
pub struct PendingInstruction {
    pub from_currency: String,
    pub to_currency: String,
    pub amount: Decimal,
    pub purpose: String,
    pub reference: String,
}

/// A user account on the remote ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// The legal/natural person record on the remote ledger that owns wallets
/// and beneficiaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEntity {
    pub id: String,
    #[serde(default)]
    pub state: String,
}

/// A currency-denominated funding balance owned by an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteWallet {
    pub id: String,
    pub currency: String,
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    pub available_balance: String,
}

/// A validated payout destination owned by an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteBeneficiary {
    pub id: String,
    pub currency: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub bank_country: String,
}

/// One entity's wallets, as grouped by the organization-wide wallet
/// listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityWallets {
    pub entity_id: String,
    #[serde(default)]
    pub entity_name: String,
    #[serde(default)]
    pub wallets: Vec<RemoteWallet>,
}

/// The remote record of a submitted transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTransfer {
    pub id: String,
    #[serde(default)]
    pub state: String,
    /// Caller-supplied idempotency key; the ledger permits transfers
    /// without one, so it is optional here.
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub source_amount: String,
    #[serde(default)]
    pub source_currency: String,
    #[serde(default)]
    pub destination_amount: String,
    #[serde(default)]
    pub destination_currency: String,
    #[serde(default)]
    pub fee: String,
    #[serde(default)]
    pub rate: String,
    #[serde(default)]
    pub purpose_of_payment: String,
    #[serde(default)]
    pub created_date: String,
}

/// A locked exchange-rate offer for a specific transfer prior to
/// finalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferQuote {
    pub rate: String,
    pub inverted_rate: String,
    pub source_amount: String,
    pub destination_amount: String,
    pub source_currency: String,
    pub destination_currency: String,
    pub fee: String,
    pub fee_usd: String,
}

/// The resolved bundle of ids required to submit one transfer: funding
/// user, entity, wallet, and beneficiary. Built fresh per instruction and
/// not persisted beyond the call.
#[derive(Debug, Clone)]
pub struct Corridor {
    pub user_id: String,
    pub entity_id: String,
    pub wallet_id: String,
    pub beneficiary_id: String,
}

/// Payload for entity creation: the funding account template's fields plus
/// the placeholder birth date and the accepted-terms flag.
#[derive(Debug, Clone, Serialize)]
pub struct EntityFields {
    pub user_id: String,
    pub birth_date: String,
    pub accept_terms_and_conditions: bool,
    #[serde(flatten)]
    pub account: FundingAccount,
}

impl EntityFields {
    pub fn from_account(user_id: &str, account: &FundingAccount) -> Self {
        EntityFields {
            user_id: user_id.to_string(),
            birth_date: PLACEHOLDER_BIRTH_DATE.to_string(),
            accept_terms_and_conditions: true,
            account: account.clone(),
        }
    }
}

/// Payload for beneficiary creation: the verified funding account's fields
/// plus the owning user and entity ids.
#[derive(Debug, Clone, Serialize)]
pub struct BeneficiaryFields {
    pub user_id: String,
    pub entity_id: String,
    #[serde(flatten)]
    pub account: FundingAccount,
}

impl BeneficiaryFields {
    pub fn from_account(user_id: &str, entity_id: &str, account: &FundingAccount) -> Self {
        BeneficiaryFields {
            user_id: user_id.to_string(),
            entity_id: entity_id.to_string(),
            account: account.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: &str, reference: &str) -> InstructionRecord {
        InstructionRecord {
            from_currency: "usd".to_string(),
            to_currency: "EUR".to_string(),
            amount: amount.to_string(),
            purpose: "Invoice".to_string(),
            reference: reference.to_string(),
        }
    }

    #[test]
    fn test_parse_valid_instruction() {
        let parsed = record("100.50", "R1").parse().unwrap();
        assert_eq!(parsed.from_currency, "USD");
        assert_eq!(parsed.to_currency, "EUR");
        assert_eq!(parsed.amount.to_string(), "100.50");
        assert_eq!(parsed.reference, "R1");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let mut rec = record(" 25.00 ", "  R2  ");
        rec.from_currency = " usd ".to_string();
        let parsed = rec.parse().unwrap();
        assert_eq!(parsed.from_currency, "USD");
        assert_eq!(parsed.reference, "R2");
    }

    #[test]
    fn test_parse_rejects_bad_amount() {
        assert!(record("not-a-number", "R1").parse().is_none());
    }

    #[test]
    fn test_parse_rejects_empty_reference() {
        assert!(record("10.0", "   ").parse().is_none());
    }

    #[test]
    fn test_field_lookup() {
        let account = FundingAccount {
            currency: "EUR".to_string(),
            swift_bic: "DEUTDEFF".to_string(),
            ..FundingAccount::default()
        };
        assert_eq!(account.field("currency"), Some("EUR"));
        assert_eq!(account.field("swift_bic"), Some("DEUTDEFF"));
        assert_eq!(account.field("bank_name"), Some(""));
        assert_eq!(account.field("no_such_variable"), None);
    }

    #[test]
    fn test_entity_fields_carry_placeholder_birth_date() {
        let account = FundingAccount::default();
        let fields = EntityFields::from_account("u-1", &account);
        assert_eq!(fields.birth_date, PLACEHOLDER_BIRTH_DATE);
        assert!(fields.accept_terms_and_conditions);
    }

    #[test]
    fn test_beneficiary_fields_flatten_account() {
        let account = FundingAccount {
            currency: "EUR".to_string(),
            ..FundingAccount::default()
        };
        let fields = BeneficiaryFields::from_account("u-1", "e-1", &account);
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value["user_id"], "u-1");
        assert_eq!(value["entity_id"], "e-1");
        assert_eq!(value["currency"], "EUR");
    }
}
