// Path-driven runs: read the bank export and the ledger workbook, then hand
// both to the engine stage by stage.

use std::path::Path;

use tallyjoin_recon::ledger::read_ledger;
use tallyjoin_recon::model::{LedgerBlock, ReconOutcome, ReconSummary, ReconTable};
use tallyjoin_recon::progress::{ProgressTracker, LEDGER_OPENED};
use tallyjoin_recon::{CancelToken, ProgressSink, ReconConfig, ReconError, Reconciler};

use crate::xlsx::{import_first_sheet, ImportResult};

fn io_error(path: &Path, msg: String) -> ReconError {
    ReconError::Io(format!("{}: {}", path.display(), msg))
}

fn log_import(path: &Path, imported: &ImportResult) {
    log::info!(
        "ledger {} sheet '{}': {} cells over {} rows, {} dates, {} other sheet(s) skipped ({} ms)",
        path.display(),
        imported.sheet_name,
        imported.cells_imported,
        imported.grid.max_row(),
        imported.dates_imported,
        imported.sheets_skipped,
        imported.import_duration_ms
    );
}

/// Reconcile a bank CSV against a ledger workbook. Never fails: every error
/// becomes the outcome's status.
pub fn reconcile_files(
    bank_path: &Path,
    ledger_path: &Path,
    config: &ReconConfig,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> ReconOutcome {
    match try_reconcile_files(bank_path, ledger_path, config, progress, cancel) {
        Ok((table, summary)) => ReconOutcome::success(table, summary),
        Err(e) => {
            log::warn!("reconciliation failed: {} ({e})", e.status());
            ReconOutcome::failure(&e)
        }
    }
}

pub fn try_reconcile_files(
    bank_path: &Path,
    ledger_path: &Path,
    config: &ReconConfig,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<(ReconTable, ReconSummary), ReconError> {
    let mut run = Reconciler::new(config, progress, cancel)?;

    let bank_csv = crate::csv::read_file_as_utf8(bank_path).map_err(|e| io_error(bank_path, e))?;
    log::info!("bank export {} ({} bytes)", bank_path.display(), bank_csv.len());
    let bank = run.load_bank(&bank_csv)?;

    let imported = import_first_sheet(ledger_path).map_err(|e| io_error(ledger_path, e))?;
    log_import(ledger_path, &imported);
    run.ledger_opened()?;
    let block = run.load_ledger(&imported.grid)?;

    run.join(bank, &block)
}

/// Open a ledger workbook and decode its record block without a bank export.
pub fn inspect_ledger(
    ledger_path: &Path,
    config: &ReconConfig,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<LedgerBlock, ReconError> {
    config.validate()?;
    let mut tracker = ProgressTracker::new(progress);
    let imported = import_first_sheet(ledger_path).map_err(|e| io_error(ledger_path, e))?;
    log_import(ledger_path, &imported);
    tracker.advance_to(LEDGER_OPENED);
    read_ledger(&imported.grid, config, &mut tracker, cancel)
}
