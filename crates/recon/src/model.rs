use chrono::NaiveDate;
use serde::Serialize;

use crate::cell::CellValue;
use crate::config::{ColumnSet, JoinKind};

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// One row of the bank export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankTransaction {
    /// 1-based data row in the export (header excluded).
    pub row: usize,
    pub transaction_date: BankDate,
    pub post_date: BankDate,
    pub description: String,
    pub amount: BankAmount,
    pub memo: String,
    /// Set only when the description carries the tag.
    pub account_id: Option<String>,
}

/// A bank date cell. Text that matches none of the configured formats (a
/// pending row's blank post date, say) is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BankDate {
    Parsed(NaiveDate),
    Raw(String),
}

/// A bank amount in minor units, or the export's text when it is not a plain
/// decimal (`$25.00`, `(12.00)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BankAmount {
    Cents(i64),
    Raw(String),
}

impl BankDate {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Parsed(d) => Some(*d),
            Self::Raw(_) => None,
        }
    }

    fn to_cell(&self) -> OutputCell {
        match self {
            Self::Parsed(d) => OutputCell::Date(*d),
            Self::Raw(s) => text_cell(s),
        }
    }
}

impl BankAmount {
    pub fn cents(&self) -> Option<i64> {
        match self {
            Self::Cents(c) => Some(*c),
            Self::Raw(_) => None,
        }
    }

    fn to_cell(&self) -> OutputCell {
        match self {
            Self::Cents(c) => OutputCell::Money(*c),
            Self::Raw(s) => text_cell(s),
        }
    }
}

/// One 3-row stride of the ledger block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRecord {
    /// Sheet row holding the account id.
    pub row: u32,
    pub account_id: String,
    pub cause_number: CellValue,
    pub matter_number: CellValue,
    pub description: CellValue,
    pub submission_date: CellValue,
    pub acceptance_date: CellValue,
}

/// Ledger records plus where they were found.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerBlock {
    pub header_row: u32,
    pub start_row: u32,
    pub records: Vec<LedgerRecord>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A bank row with its ledger match, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRow {
    pub bank: BankTransaction,
    pub ledger: Option<LedgerRecord>,
}

pub const STANDARD_HEADERS: [&str; 9] = [
    "Transaction Date",
    "Post Date",
    "Description",
    "Amount",
    "Memo",
    "Account ID",
    "Cause Number",
    "Matter Number",
    "Reconciliation Description",
];

pub const DATED_HEADERS: [&str; 2] = ["Submission Date", "Acceptance Date"];

/// A typed output cell handed to writers.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    Blank,
    Text(String),
    Date(NaiveDate),
    /// Amount in minor units.
    Money(i64),
    Value(CellValue),
}

/// Reconciled table in bank source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconTable {
    pub columns: ColumnSet,
    pub rows: Vec<ReconciledRow>,
}

impl ReconTable {
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = STANDARD_HEADERS.to_vec();
        if self.columns == ColumnSet::Dated {
            headers.extend(DATED_HEADERS);
        }
        headers
    }

    /// Cells of one row, aligned with [`ReconTable::headers`]. Ledger cells are
    /// `Blank` when the row is unmatched.
    pub fn cells(&self, row: &ReconciledRow) -> Vec<OutputCell> {
        let bank = &row.bank;
        let mut cells = vec![
            bank.transaction_date.to_cell(),
            bank.post_date.to_cell(),
            text_cell(&bank.description),
            bank.amount.to_cell(),
            text_cell(&bank.memo),
            bank.account_id.as_deref().map_or(OutputCell::Blank, text_cell),
        ];

        let dated = self.columns == ColumnSet::Dated;
        match &row.ledger {
            Some(record) => {
                cells.push(value_cell(&record.cause_number));
                cells.push(value_cell(&record.matter_number));
                cells.push(value_cell(&record.description));
                if dated {
                    cells.push(value_cell(&record.submission_date));
                    cells.push(value_cell(&record.acceptance_date));
                }
            }
            None => {
                let width = if dated { 5 } else { 3 };
                cells.extend(std::iter::repeat(OutputCell::Blank).take(width));
            }
        }
        cells
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn text_cell(s: &str) -> OutputCell {
    if s.is_empty() {
        OutputCell::Blank
    } else {
        OutputCell::Text(s.to_string())
    }
}

fn value_cell(v: &CellValue) -> OutputCell {
    if v.is_empty() {
        OutputCell::Blank
    } else {
        OutputCell::Value(v.clone())
    }
}

/// Format minor units as a fixed two-decimal amount ("-25.00").
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

// ---------------------------------------------------------------------------
// Status + Summary + Outcome
// ---------------------------------------------------------------------------

/// Terminal outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconStatus {
    Success,
    FailBankAcctLen,
    FailRecoNoId,
    #[serde(rename = "FAIL_RECO_NO_PLUS_3")]
    FailRecoNoPlus3,
    FailRecoAcctLen,
    FailRecoLarge,
    Cancelled,
    FailInput,
}

impl ReconStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::FailBankAcctLen => "FAIL_BANK_ACCT_LEN",
            Self::FailRecoNoId => "FAIL_RECO_NO_ID",
            Self::FailRecoNoPlus3 => "FAIL_RECO_NO_PLUS_3",
            Self::FailRecoAcctLen => "FAIL_RECO_ACCT_LEN",
            Self::FailRecoLarge => "FAIL_RECO_LARGE",
            Self::Cancelled => "CANCELLED",
            Self::FailInput => "FAIL_INPUT",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for ReconStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub bank_rows: usize,
    pub tagged_rows: usize,
    pub ledger_records: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Ledger records ignored because an earlier record had the same id.
    pub duplicate_ledger_ids: usize,
    pub output_rows: usize,
    pub header_row: u32,
    pub start_row: u32,
    pub join: JoinKind,
}

/// What one run hands back to its caller. `table` is `Some` only on success.
#[derive(Debug, Clone, Serialize)]
pub struct ReconOutcome {
    pub status: ReconStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReconSummary>,
    #[serde(skip)]
    pub table: Option<ReconTable>,
}

impl ReconOutcome {
    pub fn success(table: ReconTable, summary: ReconSummary) -> Self {
        Self {
            status: ReconStatus::Success,
            message: None,
            summary: Some(summary),
            table: Some(table),
        }
    }

    pub fn failure(err: &crate::error::ReconError) -> Self {
        Self {
            status: err.status(),
            message: Some(err.to_string()),
            summary: None,
            table: None,
        }
    }
}
