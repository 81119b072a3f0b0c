//! `tallyjoin-recon` - bank-to-ledger account reconciliation engine.
//!
//! Pure engine crate: receives the bank export as CSV text and the ledger as a
//! [`CellSource`], returns a joined table or a terminal status.
//! No CLI or file IO dependencies.

pub mod bank;
pub mod cancel;
pub mod cell;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod join;
pub mod ledger;
pub mod model;
pub mod progress;
pub mod summary;

pub use cancel::CancelToken;
pub use cell::{CellSource, CellValue, Grid};
pub use config::ReconConfig;
pub use engine::{reconcile, try_reconcile, Reconciler};
pub use error::ReconError;
pub use model::{OutputCell, ReconOutcome, ReconStatus, ReconSummary, ReconTable};
pub use progress::{NoProgress, ProgressSink};
