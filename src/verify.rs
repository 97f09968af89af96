//! Field verification for candidate beneficiary accounts.
//!
//! A funding account must pass verification against the country/currency
//! route's required-field rules before a beneficiary may be created from
//! it. The rules come from the remote ledger; this module checks that every
//! required field is present on the account. Evaluating the server-supplied
//! regex patterns locally is out of scope; each pattern is carried through
//! in the report so the operator can inspect what the server will enforce.

use crate::error::{OrchestratorError, Result};
use crate::ledger::LedgerService;
use crate::model::FundingAccount;
use log::debug;
use serde::{Deserialize, Serialize};

/// Fields the ledger assigns at creation time; requirements naming them are
/// reported as ignored rather than missing.
const IGNORED_VARIABLES: &[&str] = &["entity_id", "type"];

/// A payout route: destination bank country, beneficiary country, currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub bank_country: String,
    pub beneficiary_country: String,
    pub currency: String,
}

impl Route {
    /// Derives the route a funding account would be paid out over.
    pub fn for_account(account: &FundingAccount) -> Self {
        Route {
            bank_country: account.bank_country.clone(),
            beneficiary_country: account.country.clone(),
            currency: account.currency.clone(),
        }
    }
}

/// One required-field rule as served by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRequirement {
    pub variable: String,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
}

/// Outcome of checking one required field against an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCondition {
    /// Present on the account
    Valid,
    /// Required by the route but absent or empty on the account
    Missing,
    /// Assigned by the ledger at creation time; not the account's concern
    Ignored,
}

/// Per-field verification result.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub name: String,
    pub condition: FieldCondition,
    /// Server-supplied pattern the ledger will enforce for this field,
    /// if any. Not evaluated locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Verification result for one account over its payout route.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub route: Route,
    pub valid: bool,
    pub fields: Vec<FieldReport>,
}

/// Validates a candidate beneficiary account against route-specific
/// required-field rules.
pub trait FieldVerifier {
    fn verify(&self, account: &FundingAccount) -> Result<VerificationReport>;
}

/// [`FieldVerifier`] backed by the ledger's required-field rules.
pub struct RequirementsVerifier<'a> {
    ledger: &'a dyn LedgerService,
}

impl<'a> RequirementsVerifier<'a> {
    pub fn new(ledger: &'a dyn LedgerService) -> Self {
        RequirementsVerifier { ledger }
    }

    /// Fetches the required-field rules for a route.
    pub fn requirements(&self, route: &Route) -> Result<Vec<FieldRequirement>> {
        self.ledger.beneficiary_required_fields(route).map_err(|e| {
            debug!("requirements lookup failed: {}", e);
            OrchestratorError::Requirements {
                bank_country: route.bank_country.clone(),
                country: route.beneficiary_country.clone(),
                currency: route.currency.clone(),
            }
        })
    }
}

impl FieldVerifier for RequirementsVerifier<'_> {
    fn verify(&self, account: &FundingAccount) -> Result<VerificationReport> {
        let route = Route::for_account(account);
        let requirements = self.requirements(&route)?;

        let mut valid = true;
        let fields = requirements
            .into_iter()
            .map(|requirement| {
                let condition = if IGNORED_VARIABLES.contains(&requirement.variable.as_str()) {
                    FieldCondition::Ignored
                } else {
                    match account.field(&requirement.variable) {
                        Some(value) if !value.is_empty() => FieldCondition::Valid,
                        _ => {
                            valid = false;
                            FieldCondition::Missing
                        }
                    }
                };
                FieldReport {
                    name: requirement.variable,
                    condition,
                    pattern: requirement.regex,
                }
            })
            .collect();

        Ok(VerificationReport {
            route,
            valid,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BeneficiaryFields, Corridor, EntityFields, EntityWallets, RemoteBeneficiary, RemoteEntity,
        RemoteTransfer, RemoteWallet, TransferQuote, UserAccount,
    };

    /// Ledger stub that only serves required-field rules.
    struct RulesOnly {
        rules: Vec<FieldRequirement>,
        fail: bool,
    }

    impl LedgerService for RulesOnly {
        fn list_users(&self) -> Result<Vec<UserAccount>> {
            Ok(Vec::new())
        }
        fn list_user_entities(&self, _: &str) -> Result<Vec<RemoteEntity>> {
            Ok(Vec::new())
        }
        fn create_entity(&self, _: &EntityFields) -> Result<Option<String>> {
            Ok(None)
        }
        fn list_wallets(&self, _: &str) -> Result<Vec<RemoteWallet>> {
            Ok(Vec::new())
        }
        fn create_wallet(&self, _: &str, _: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn list_beneficiaries(&self, _: &str) -> Result<Vec<RemoteBeneficiary>> {
            Ok(Vec::new())
        }
        fn create_beneficiary(&self, _: &BeneficiaryFields) -> Result<Option<String>> {
            Ok(None)
        }
        fn create_transfer(&self, _: &Corridor, _: &str, _: &str, _: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn quote_transfer(&self, _: &str) -> Result<TransferQuote> {
            Ok(TransferQuote::default())
        }
        fn finalize_transfer(&self, _: &str) -> Result<()> {
            Ok(())
        }
        fn list_transfers(&self, _: usize) -> Result<Vec<RemoteTransfer>> {
            Ok(Vec::new())
        }
        fn beneficiary_required_fields(&self, _: &Route) -> Result<Vec<FieldRequirement>> {
            if self.fail {
                return Err(OrchestratorError::RemoteCall {
                    operation: "beneficiaryRequiredFields",
                    message: "route not supported".to_string(),
                });
            }
            Ok(self.rules.clone())
        }
        fn list_org_entities(&self, _: usize) -> Result<Vec<RemoteEntity>> {
            Ok(Vec::new())
        }
        fn list_org_wallets(&self, _: usize) -> Result<Vec<EntityWallets>> {
            Ok(Vec::new())
        }
        fn list_org_beneficiaries(&self, _: usize) -> Result<Vec<RemoteBeneficiary>> {
            Ok(Vec::new())
        }
    }

    fn requirement(variable: &str, regex: Option<&str>) -> FieldRequirement {
        FieldRequirement {
            variable: variable.to_string(),
            regex: regex.map(str::to_string),
            example: None,
        }
    }

    fn account() -> FundingAccount {
        FundingAccount {
            currency: "EUR".to_string(),
            country: "DE".to_string(),
            bank_country: "DE".to_string(),
            account_number: "DE89370400440532013000".to_string(),
            swift_bic: "DEUTDEFF".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            ..FundingAccount::default()
        }
    }

    #[test]
    fn test_all_fields_present_is_valid() {
        let ledger = RulesOnly {
            rules: vec![
                requirement("account_number", Some("^[A-Z0-9]+$")),
                requirement("swift_bic", None),
            ],
            fail: false,
        };
        let report = RequirementsVerifier::new(&ledger).verify(&account()).unwrap();
        assert!(report.valid);
        assert!(report
            .fields
            .iter()
            .all(|f| f.condition == FieldCondition::Valid));
        // The server-side pattern is carried through untouched.
        assert_eq!(report.fields[0].pattern.as_deref(), Some("^[A-Z0-9]+$"));
    }

    #[test]
    fn test_missing_field_marks_report_invalid() {
        let ledger = RulesOnly {
            rules: vec![
                requirement("account_number", None),
                requirement("routing_code", None),
            ],
            fail: false,
        };
        let report = RequirementsVerifier::new(&ledger).verify(&account()).unwrap();
        assert!(!report.valid);
        assert_eq!(report.fields[1].name, "routing_code");
        assert_eq!(report.fields[1].condition, FieldCondition::Missing);
    }

    #[test]
    fn test_creation_time_fields_are_ignored() {
        let ledger = RulesOnly {
            rules: vec![requirement("entity_id", None), requirement("type", None)],
            fail: false,
        };
        let report = RequirementsVerifier::new(&ledger).verify(&account()).unwrap();
        assert!(report.valid);
        assert!(report
            .fields
            .iter()
            .all(|f| f.condition == FieldCondition::Ignored));
    }

    #[test]
    fn test_unknown_variable_is_missing() {
        let ledger = RulesOnly {
            rules: vec![requirement("tax_number", None)],
            fail: false,
        };
        let report = RequirementsVerifier::new(&ledger).verify(&account()).unwrap();
        assert!(!report.valid);
        assert_eq!(report.fields[0].condition, FieldCondition::Missing);
    }

    #[test]
    fn test_lookup_failure_maps_to_requirements_error() {
        let ledger = RulesOnly {
            rules: Vec::new(),
            fail: true,
        };
        let err = RequirementsVerifier::new(&ledger)
            .verify(&account())
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Requirements { currency, .. } if currency == "EUR"
        ));
    }
}
