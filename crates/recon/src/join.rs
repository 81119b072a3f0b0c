use std::collections::HashMap;

use crate::config::JoinKind;
use crate::model::{BankTransaction, LedgerRecord, ReconciledRow};

/// Joined rows plus the counts the summary needs.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutput {
    pub rows: Vec<ReconciledRow>,
    pub matched: usize,
    pub unmatched: usize,
    pub duplicate_ledger_ids: usize,
}

/// Join bank transactions onto ledger records by account id, in bank order.
///
/// When several ledger records share an id the first one in sheet order is
/// used. Bank rows without an id never match.
pub fn join_by_account_id(
    bank: Vec<BankTransaction>,
    ledger: &[LedgerRecord],
    kind: JoinKind,
) -> JoinOutput {
    let mut index: HashMap<&str, &LedgerRecord> = HashMap::with_capacity(ledger.len());
    let mut duplicate_ledger_ids = 0;
    for record in ledger {
        if let Some(first) = index.get(record.account_id.as_str()) {
            log::warn!(
                "ledger id {} repeated at row {} (keeping row {})",
                record.account_id,
                record.row,
                first.row
            );
            duplicate_ledger_ids += 1;
            continue;
        }
        index.insert(record.account_id.as_str(), record);
    }

    let mut rows = Vec::with_capacity(bank.len());
    let mut matched = 0;
    let mut unmatched = 0;

    for txn in bank {
        let hit = txn
            .account_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| index.get(id))
            .map(|record| (*record).clone());

        match hit {
            Some(record) => {
                matched += 1;
                rows.push(ReconciledRow {
                    bank: txn,
                    ledger: Some(record),
                });
            }
            None => {
                unmatched += 1;
                if kind == JoinKind::Left {
                    rows.push(ReconciledRow {
                        bank: txn,
                        ledger: None,
                    });
                }
            }
        }
    }

    JoinOutput {
        rows,
        matched,
        unmatched,
        duplicate_ledger_ids,
    }
}
