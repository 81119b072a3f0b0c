use crate::config::JoinKind;
use crate::join::JoinOutput;
use crate::model::{BankTransaction, LedgerBlock, ReconSummary};

/// Row counts taken from the bank export before it is consumed by the join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BankCounts {
    pub rows: usize,
    pub tagged: usize,
}

impl BankCounts {
    pub fn of(bank: &[BankTransaction]) -> Self {
        Self {
            rows: bank.len(),
            tagged: bank.iter().filter(|t| t.account_id.is_some()).count(),
        }
    }
}

/// Compute run statistics from the loaded inputs and the join result.
pub fn compute_summary(
    bank: BankCounts,
    block: &LedgerBlock,
    joined: &JoinOutput,
    join: JoinKind,
) -> ReconSummary {
    ReconSummary {
        bank_rows: bank.rows,
        tagged_rows: bank.tagged,
        ledger_records: block.records.len(),
        matched: joined.matched,
        unmatched: joined.unmatched,
        duplicate_ledger_ids: joined.duplicate_ledger_ids,
        output_rows: joined.rows.len(),
        header_row: block.header_row,
        start_row: block.start_row,
        join,
    }
}
