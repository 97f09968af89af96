//! Remit Orchestrator CLI
//!
//! Resolves transfer corridors against a remote ledger and submits pending
//! transfers as an idempotent batch.
//!
//! # Usage
//!
//! ```bash
//! remit-orchestrator transfer
//! remit-orchestrator verify
//! remit-orchestrator requirements <bank_country> <country> <currency>
//! remit-orchestrator data
//! ```
//!
//! # Environment Variables
//!
//! - `LEDGER_API_URL`, `LEDGER_API_KEY`: remote ledger endpoint and token
//! - `ACCOUNTS_FILE`, `TRANSFERS_FILE`: data source paths (default `data/`)
//! - `RUST_LOG`: logging verbosity

use remit_orchestrator::verify::Route;
use remit_orchestrator::{
    source, BatchOrchestrator, Config, FieldVerifier, GraphQlClient, LedgerService,
    OrchestratorError, RequirementsVerifier, Result,
};
use std::env;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).ok_or(OrchestratorError::MissingArgument)?;

    match command.as_str() {
        "transfer" => run_transfer(),
        "verify" => run_verify(),
        "requirements" => run_requirements(&args[2..]),
        "data" => run_data(),
        _ => Err(OrchestratorError::MissingArgument),
    }
}

/// Runs the batch and prints the reconciled transfer records.
fn run_transfer() -> Result<()> {
    let config = Config::from_env()?;
    let client = GraphQlClient::new(&config.api_url, &config.api_key)?;

    let accounts = source::load_accounts(BufReader::new(File::open(&config.accounts_file)?))?;
    let instructions =
        source::load_instructions(BufReader::new(File::open(&config.transfers_file)?))?;

    let verifier = RequirementsVerifier::new(&client);
    let orchestrator = BatchOrchestrator::new(&client, &verifier);
    let transfers = orchestrator.run(&accounts, &instructions);

    print_json(&transfers)
}

/// Verifies every funding account against its route's required fields.
fn run_verify() -> Result<()> {
    let config = Config::from_env()?;
    let client = GraphQlClient::new(&config.api_url, &config.api_key)?;

    let accounts = source::load_accounts(BufReader::new(File::open(&config.accounts_file)?))?;
    let verifier = RequirementsVerifier::new(&client);

    let reports = accounts
        .iter()
        .map(|account| verifier.verify(account))
        .collect::<Result<Vec<_>>>()?;

    print_json(&reports)
}

/// Prints the required-field rules for a route.
fn run_requirements(args: &[String]) -> Result<()> {
    let [bank_country, country, currency] = args else {
        eprintln!("Usage: remit-orchestrator requirements <bank_country> <country> <currency>");
        return Err(OrchestratorError::MissingArgument);
    };

    let config = Config::from_env()?;
    let client = GraphQlClient::new(&config.api_url, &config.api_key)?;
    let verifier = RequirementsVerifier::new(&client);

    let route = Route {
        bank_country: bank_country.to_uppercase(),
        beneficiary_country: country.to_uppercase(),
        currency: currency.to_uppercase(),
    };
    let requirements = verifier.requirements(&route)?;

    print_json(&requirements)
}

/// Dumps the organization's remote records as one JSON document.
fn run_data() -> Result<()> {
    let config = Config::from_env()?;
    let client = GraphQlClient::new(&config.api_url, &config.api_key)?;

    let dump = serde_json::json!({
        "users": client.list_users()?,
        "entities": client.list_org_entities(DATA_PAGE_LIMIT)?,
        "wallets": client.list_org_wallets(DATA_PAGE_LIMIT)?,
        "beneficiaries": client.list_org_beneficiaries(DATA_PAGE_LIMIT)?,
        "transfers": client.list_transfers(DATA_PAGE_LIMIT)?,
    });

    print_json(&dump)
}

/// Bounded page fetched per record type by the `data` dump.
const DATA_PAGE_LIMIT: usize = 100;

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}
