//! Data source loading: funding accounts (JSON) and pending transfer
//! instructions (CSV).
//!
//! Instruction rows are validated one at a time; invalid rows are logged at
//! warn level and skipped so one bad row does not reject the whole file.

use crate::error::Result;
use crate::model::{FundingAccount, InstructionRecord, PendingInstruction};
use csv::{ReaderBuilder, Trim};
use log::warn;
use std::io::Read;

/// Loads the funding account definitions from a JSON array.
pub fn load_accounts<R: Read>(reader: R) -> Result<Vec<FundingAccount>> {
    let accounts: Vec<FundingAccount> = serde_json::from_reader(reader)?;
    Ok(accounts)
}

/// Loads pending transfer instructions from CSV, preserving input order.
pub fn load_instructions<R: Read>(reader: R) -> Result<Vec<PendingInstruction>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut instructions = Vec::new();
    for (row_idx, result) in csv_reader.deserialize::<InstructionRecord>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        match result {
            Ok(record) => {
                if let Some(instruction) = record.parse() {
                    instructions.push(instruction);
                } else {
                    warn!("Row {}: Failed to parse instruction record", row_num);
                }
            }
            Err(e) => {
                warn!("Row {}: CSV parse error: {}", row_num, e);
            }
        }
    }

    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_load_instructions_preserves_order() {
        let csv = "fromCurrency,toCurrency,amount,purpose,reference\n\
                   USD,EUR,100,Invoice,R1\n\
                   USD,GBP,250.50,Payroll,R2\n";
        let instructions = load_instructions(Cursor::new(csv)).unwrap();
        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].reference, "R1");
        assert_eq!(instructions[1].reference, "R2");
        assert_eq!(instructions[1].amount.to_string(), "250.50");
    }

    #[test]
    fn test_load_instructions_skips_bad_rows() {
        let csv = "fromCurrency,toCurrency,amount,purpose,reference\n\
                   USD,EUR,abc,Invoice,R1\n\
                   USD,EUR,50,Invoice,R2\n\
                   USD,EUR,75,Invoice,\n";
        let instructions = load_instructions(Cursor::new(csv)).unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].reference, "R2");
    }

    #[test]
    fn test_load_instructions_trims_whitespace() {
        let csv = "fromCurrency, toCurrency, amount, purpose, reference\n\
                   usd, eur, 10.0, Invoice, R1\n";
        let instructions = load_instructions(Cursor::new(csv)).unwrap();
        assert_eq!(instructions[0].from_currency, "USD");
        assert_eq!(instructions[0].to_currency, "EUR");
    }

    #[test]
    fn test_load_accounts() {
        let json = r#"[
            {"currency": "USD", "country": "US", "bank_country": "US"},
            {"currency": "EUR", "country": "DE", "bank_country": "DE", "swift_bic": "DEUTDEFF"}
        ]"#;
        let accounts = load_accounts(Cursor::new(json)).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].currency, "EUR");
        assert_eq!(accounts[1].swift_bic, "DEUTDEFF");
        assert_eq!(accounts[0].swift_bic, "");
    }

    #[test]
    fn test_load_accounts_rejects_malformed_json() {
        assert!(load_accounts(Cursor::new("{not json")).is_err());
    }
}
