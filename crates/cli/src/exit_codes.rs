//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                                |
//! |---------|------------------|--------------------------------------------|
//! | 0       | Universal        | Success                                    |
//! | 1       | Universal        | General error (unspecified)                |
//! | 2       | Universal        | CLI usage error (bad args, bad extension)  |
//! | 3-9     | setup            | Config and output file problems            |
//! | 10-19   | run              | Terminal reconciliation statuses           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use tallyjoin_recon::ReconStatus;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, empty path, unsupported output extension.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Setup (3-9)
// =============================================================================

/// Config file unreadable, malformed TOML, unknown key, or failed validation.
pub const EXIT_CONFIG: u8 = 3;

/// Reconciliation succeeded but the output file could not be written.
pub const EXIT_OUTPUT_WRITE: u8 = 4;

// =============================================================================
// Run statuses (10-19)
// =============================================================================

/// A tagged bank description yielded an account id of the wrong length.
pub const EXIT_FAIL_BANK_ACCT_LEN: u8 = 10;

/// No ledger header within the scan window.
pub const EXIT_FAIL_RECO_NO_ID: u8 = 11;

/// Non-text ledger cell where an account id was expected.
pub const EXIT_FAIL_RECO_NO_PLUS_3: u8 = 12;

/// Ledger account id text of the wrong length.
pub const EXIT_FAIL_RECO_ACCT_LEN: u8 = 13;

/// Ledger decoding hit the runaway-iteration bound.
pub const EXIT_FAIL_RECO_LARGE: u8 = 14;

/// Run stopped through its cancellation token.
pub const EXIT_CANCELLED: u8 = 15;

/// An input file could not be read or parsed.
pub const EXIT_FAIL_INPUT: u8 = 16;

/// Map a terminal run status to its exit code.
pub fn status_exit_code(status: ReconStatus) -> u8 {
    match status {
        ReconStatus::Success => EXIT_SUCCESS,
        ReconStatus::FailBankAcctLen => EXIT_FAIL_BANK_ACCT_LEN,
        ReconStatus::FailRecoNoId => EXIT_FAIL_RECO_NO_ID,
        ReconStatus::FailRecoNoPlus3 => EXIT_FAIL_RECO_NO_PLUS_3,
        ReconStatus::FailRecoAcctLen => EXIT_FAIL_RECO_ACCT_LEN,
        ReconStatus::FailRecoLarge => EXIT_FAIL_RECO_LARGE,
        ReconStatus::Cancelled => EXIT_CANCELLED,
        ReconStatus::FailInput => EXIT_FAIL_INPUT,
    }
}
