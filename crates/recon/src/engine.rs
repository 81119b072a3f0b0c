use crate::cancel::CancelToken;
use crate::cell::CellSource;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::extract::IdExtractor;
use crate::join::join_by_account_id;
use crate::ledger::read_ledger;
use crate::model::{BankTransaction, LedgerBlock, ReconOutcome, ReconSummary, ReconTable};
use crate::progress::{ProgressSink, ProgressTracker, BANK_LOADED, DONE, JOINING, LEDGER_OPENED};
use crate::summary::{compute_summary, BankCounts};

/// One reconciliation run, driven stage by stage.
///
/// Callers that already hold both inputs use [`reconcile`]. Callers that open
/// files themselves call the stages in order so progress reflects real work:
/// [`load_bank`](Self::load_bank), [`ledger_opened`](Self::ledger_opened),
/// [`load_ledger`](Self::load_ledger), [`join`](Self::join).
pub struct Reconciler<'a> {
    config: &'a ReconConfig,
    tracker: ProgressTracker<'a>,
    cancel: &'a CancelToken,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        config: &'a ReconConfig,
        progress: &'a mut dyn ProgressSink,
        cancel: &'a CancelToken,
    ) -> Result<Self, ReconError> {
        config.validate()?;
        Ok(Self {
            config,
            tracker: ProgressTracker::new(progress),
            cancel,
        })
    }

    pub fn load_bank(&mut self, csv_data: &str) -> Result<Vec<BankTransaction>, ReconError> {
        let extractor = IdExtractor::new(&self.config.extract);
        let bank = crate::bank::load_bank_transactions(csv_data, &self.config.bank, &extractor, self.cancel)?;
        self.tracker.advance_to(BANK_LOADED);
        Ok(bank)
    }

    /// The ledger sheet is open and about to be scanned.
    pub fn ledger_opened(&mut self) -> Result<(), ReconError> {
        self.cancel.check()?;
        self.tracker.advance_to(LEDGER_OPENED);
        Ok(())
    }

    pub fn load_ledger<S: CellSource + ?Sized>(&mut self, sheet: &S) -> Result<LedgerBlock, ReconError> {
        read_ledger(sheet, self.config, &mut self.tracker, self.cancel)
    }

    pub fn join(
        &mut self,
        bank: Vec<BankTransaction>,
        block: &LedgerBlock,
    ) -> Result<(ReconTable, ReconSummary), ReconError> {
        self.cancel.check()?;
        self.tracker.advance_to(JOINING);

        let kind = self.config.join.kind;
        let counts = BankCounts::of(&bank);
        let joined = join_by_account_id(bank, &block.records, kind);
        let summary = compute_summary(counts, block, &joined, kind);
        log::info!(
            "{} join: {} matched, {} unmatched, {} rows out",
            kind,
            summary.matched,
            summary.unmatched,
            summary.output_rows
        );

        let table = ReconTable {
            columns: self.config.output.columns,
            rows: joined.rows,
        };
        self.tracker.advance_to(DONE);
        Ok((table, summary))
    }
}

/// Run every stage over in-memory inputs, propagating the first failure.
pub fn try_reconcile<S: CellSource + ?Sized>(
    bank_csv: &str,
    sheet: &S,
    config: &ReconConfig,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<(ReconTable, ReconSummary), ReconError> {
    let mut run = Reconciler::new(config, progress, cancel)?;
    let bank = run.load_bank(bank_csv)?;
    run.ledger_opened()?;
    let block = run.load_ledger(sheet)?;
    run.join(bank, &block)
}

/// Run every stage and fold the result into a terminal outcome. Never fails.
pub fn reconcile<S: CellSource + ?Sized>(
    bank_csv: &str,
    sheet: &S,
    config: &ReconConfig,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> ReconOutcome {
    match try_reconcile(bank_csv, sheet, config, progress, cancel) {
        Ok((table, summary)) => ReconOutcome::success(table, summary),
        Err(e) => {
            log::warn!("reconciliation failed: {} ({e})", e.status());
            ReconOutcome::failure(&e)
        }
    }
}
