use std::fmt;

use crate::model::ReconStatus;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad column letter, zero stride, etc.).
    ConfigValidation(String),
    /// Missing required column in the bank export.
    MissingColumn { column: String },
    /// Date parse error in the bank export.
    DateParse { row: usize, column: String, value: String },
    /// Amount parse error in the bank export.
    AmountParse { row: usize, value: String },
    /// A tagged description stripped down to an identifier of the wrong length.
    BankAccountLength { row: usize, description: String, extracted: String },
    /// Header label not found within the scan window.
    LedgerNoHeader { label: String, column: String, scan_rows: u32 },
    /// Non-text value where an account identifier was expected.
    LedgerNotText { row: u32, found: &'static str },
    /// Identifier text of the wrong length.
    LedgerAccountLength { row: u32, value: String },
    /// Read cursor passed the runaway-iteration bound.
    LedgerTooLarge { row: u32, limit: u32 },
    /// Cancellation token was set.
    Cancelled,
    /// IO error (file read, spreadsheet open, etc.).
    Io(String),
}

impl ReconError {
    /// Terminal status this error ends a run with.
    pub fn status(&self) -> ReconStatus {
        match self {
            Self::BankAccountLength { .. } => ReconStatus::FailBankAcctLen,
            Self::LedgerNoHeader { .. } => ReconStatus::FailRecoNoId,
            Self::LedgerNotText { .. } => ReconStatus::FailRecoNoPlus3,
            Self::LedgerAccountLength { .. } => ReconStatus::FailRecoAcctLen,
            Self::LedgerTooLarge { .. } => ReconStatus::FailRecoLarge,
            Self::Cancelled => ReconStatus::Cancelled,
            Self::ConfigParse(_)
            | Self::ConfigValidation(_)
            | Self::MissingColumn { .. }
            | Self::DateParse { .. }
            | Self::AmountParse { .. }
            | Self::Io(_) => ReconStatus::FailInput,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { column } => {
                write!(f, "bank export: missing column '{column}'")
            }
            Self::DateParse { row, column, value } => {
                write!(f, "bank export row {row}: cannot parse {column} '{value}'")
            }
            Self::AmountParse { row, value } => {
                write!(f, "bank export row {row}: cannot parse amount '{value}'")
            }
            Self::BankAccountLength { row, description, extracted } => write!(
                f,
                "bank export row {row}: description '{description}' yields account id '{extracted}' of length {}",
                extracted.chars().count()
            ),
            Self::LedgerNoHeader { label, column, scan_rows } => write!(
                f,
                "ledger: no '{label}' header in column {column} within the first {scan_rows} rows"
            ),
            Self::LedgerNotText { row, found } => {
                write!(f, "ledger row {row}: expected account id text, found {found}")
            }
            Self::LedgerAccountLength { row, value } => write!(
                f,
                "ledger row {row}: account id '{value}' has length {}",
                value.chars().count()
            ),
            Self::LedgerTooLarge { row, limit } => {
                write!(f, "ledger: read row {row} reached the {limit}-row limit")
            }
            Self::Cancelled => write!(f, "reconciliation cancelled"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
