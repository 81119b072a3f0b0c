//! `tallyjoin run`, `validate` and `inspect`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tallyjoin_io::{inspect_ledger, reconcile_files, write_table, OutputFormat};
use tallyjoin_recon::config::ColumnSet;
use tallyjoin_recon::{CancelToken, NoProgress, ProgressSink, ReconConfig, ReconOutcome, ReconStatus};

use crate::exit_codes::{status_exit_code, EXIT_OUTPUT_WRITE};
use crate::CliError;

/// One-line percentage indicator on stderr.
struct StderrProgress {
    enabled: bool,
    drawn: bool,
}

impl StderrProgress {
    fn new(enabled: bool) -> Self {
        Self { enabled, drawn: false }
    }

    fn finish(&mut self) {
        if self.drawn {
            eprintln!();
            self.drawn = false;
        }
    }
}

impl ProgressSink for StderrProgress {
    fn set(&mut self, value: u8) {
        if self.enabled {
            eprint!("\rreconciling {:>3}%", value);
            self.drawn = true;
        }
    }
}

fn require_path(path: &Path, what: &str) -> Result<(), CliError> {
    if path.as_os_str().is_empty() {
        return Err(CliError::usage(format!("{what} path is empty")));
    }
    Ok(())
}

/// Defaults when no path is given; any read or parse problem is a config error.
fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    require_path(path, "config")?;
    log::info!("loading config {}", path.display());
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::config(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| {
        CliError::config(format!("{}: {e}", path.display()))
            .with_hint("run `tallyjoin validate <config>` for details; unknown keys are rejected")
    })
}

fn status_error(outcome: &ReconOutcome) -> CliError {
    let detail = outcome.message.as_deref().unwrap_or("");
    CliError::new(status_exit_code(outcome.status), format!("{}: {}", outcome.status, detail))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

pub fn cmd_run(
    bank: PathBuf,
    ledger: PathBuf,
    output: PathBuf,
    config_path: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    require_path(&bank, "bank")?;
    require_path(&ledger, "ledger")?;
    require_path(&output, "output")?;
    OutputFormat::from_path(&output).map_err(CliError::usage)?;

    let config = load_config(config_path.as_deref())?;

    let mut progress = StderrProgress::new(!quiet);
    let outcome = reconcile_files(&bank, &ledger, &config, &mut progress, &CancelToken::new());
    progress.finish();

    if json {
        print_json(&outcome)?;
    }

    let (Some(table), Some(summary)) = (&outcome.table, &outcome.summary) else {
        return Err(status_error(&outcome));
    };

    write_table(table, &output).map_err(|e| {
        CliError::new(EXIT_OUTPUT_WRITE, format!("cannot write {}: {e}", output.display()))
    })?;

    eprintln!(
        "{} join: {} bank rows ({} tagged), {} ledger records, {} matched, {} unmatched",
        summary.join,
        summary.bank_rows,
        summary.tagged_rows,
        summary.ledger_records,
        summary.matched,
        summary.unmatched,
    );
    if summary.duplicate_ledger_ids > 0 {
        eprintln!(
            "warning: {} duplicate ledger id(s) ignored (first record wins)",
            summary.duplicate_ledger_ids
        );
    }
    eprintln!("wrote {} rows to {}", summary.output_rows, output.display());

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "valid: tag '{}' (id length {}), header '{}' in column {} within {} rows, stride {}, {} join, {} columns",
        config.extract.tag,
        config.extract.id_len,
        config.ledger.header_label,
        config.ledger.header_column,
        config.ledger.scan_rows,
        config.ledger.stride,
        config.join.kind,
        match config.output.columns {
            ColumnSet::Standard => "standard",
            ColumnSet::Dated => "dated",
        },
    );
    Ok(())
}

#[derive(Serialize)]
struct InspectOutput {
    status: ReconStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_row: Option<u32>,
    records: usize,
    account_ids: Vec<String>,
}

pub fn cmd_inspect(ledger: PathBuf, config_path: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    require_path(&ledger, "ledger")?;
    let config = load_config(config_path.as_deref())?;

    match inspect_ledger(&ledger, &config, &mut NoProgress, &CancelToken::new()) {
        Ok(block) => {
            if json {
                print_json(&InspectOutput {
                    status: ReconStatus::Success,
                    message: None,
                    header_row: Some(block.header_row),
                    start_row: Some(block.start_row),
                    records: block.records.len(),
                    account_ids: block.records.iter().map(|r| r.account_id.clone()).collect(),
                })?;
            } else {
                println!("header row:  {}", block.header_row);
                println!("block start: {}", block.start_row);
                println!("records:     {}", block.records.len());
            }
            Ok(())
        }
        Err(e) => {
            let status = e.status();
            if json {
                print_json(&InspectOutput {
                    status,
                    message: Some(e.to_string()),
                    header_row: None,
                    start_row: None,
                    records: 0,
                    account_ids: Vec::new(),
                })?;
            }
            Err(CliError::new(status_exit_code(status), format!("{status}: {e}")))
        }
    }
}
