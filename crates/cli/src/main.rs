// tallyjoin CLI - bank-to-ledger account reconciliation

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tallyjoin")]
#[command(about = "Join a bank export onto an account ledger by account id")]
#[command(version)]
struct Cli {
    /// Log progress details (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a bank CSV export against a ledger workbook
    #[command(after_help = "\
Examples:
  tallyjoin run bank.csv ledger.xlsx --output reconciled.xlsx
  tallyjoin run bank.csv ledger.xlsx --output reconciled.csv --config recon.toml
  tallyjoin run bank.csv ledger.xls -o out.xlsx --json --quiet")]
    Run {
        /// Bank export (CSV with Transaction Date, Post Date, Description, Amount, Memo)
        bank: PathBuf,

        /// Ledger workbook (xlsx, xlsm, xls, xlsb, ods); first sheet is read
        ledger: PathBuf,

        /// Output file (.xlsx or .csv)
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// TOML config (defaults apply when omitted)
        #[arg(long, short = 'c', env = "TALLYJOIN_CONFIG")]
        config: Option<PathBuf>,

        /// Print the outcome as JSON on stdout
        #[arg(long)]
        json: bool,

        /// No progress indicator
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Parse and validate a config without running
    #[command(after_help = "\
Examples:
  tallyjoin validate recon.toml")]
    Validate {
        /// Path to the TOML config
        config: PathBuf,
    },

    /// Locate the ledger header and decode the record block only
    #[command(after_help = "\
Examples:
  tallyjoin inspect ledger.xlsx
  tallyjoin inspect ledger.xlsx --config recon.toml --json")]
    Inspect {
        /// Ledger workbook
        ledger: PathBuf,

        /// TOML config (defaults apply when omitted)
        #[arg(long, short = 'c', env = "TALLYJOIN_CONFIG")]
        config: Option<PathBuf>,

        /// Print the result as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,tallyjoin=info,tallyjoin_recon=info,tallyjoin_io=info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { bank, ledger, output, config, json, quiet } => {
            recon::cmd_run(bank, ledger, output, config, json, quiet)
        }
        Commands::Validate { config } => recon::cmd_validate(config),
        Commands::Inspect { ledger, config, json } => recon::cmd_inspect(ledger, config, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
