//! One-way progress reporting.
//!
//! The engine pushes percentages into a [`ProgressSink`] and never reads them
//! back. [`ProgressTracker`] sits in front of the sink and guarantees the sink
//! only ever sees values in `0..=100` that strictly increase within a run.

/// Bank export parsed and account ids extracted.
pub const BANK_LOADED: u8 = 10;
/// Ledger sheet handed to the engine.
pub const LEDGER_OPENED: u8 = 15;
/// Header scan started.
pub const HEADER_SCAN: u8 = 20;
/// Header found; block start known.
pub const HEADER_FOUND: u8 = 25;
/// First ledger stride about to be decoded.
pub const DECODE_START: u8 = 30;
/// Ledger decoded, joining.
pub const JOINING: u8 = 99;
/// Run finished successfully.
pub const DONE: u8 = 100;

/// Receiver for progress updates (a progress bar, a log line, ...).
pub trait ProgressSink {
    fn set(&mut self, value: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn set(&mut self, value: u8) {
        self(value)
    }
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set(&mut self, _value: u8) {}
}

/// Monotonic, clamped wrapper around a caller's sink. One per run.
pub struct ProgressTracker<'a> {
    sink: &'a mut dyn ProgressSink,
    last: Option<u8>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self { sink, last: None }
    }

    /// Report `value` if it moves progress forward; otherwise drop it.
    pub fn advance_to(&mut self, value: u8) {
        let value = value.min(100);
        if self.last.is_some_and(|last| value <= last) {
            return;
        }
        self.last = Some(value);
        self.sink.set(value);
    }

    /// Last value forwarded to the sink.
    pub fn current(&self) -> u8 {
        self.last.unwrap_or(0)
    }
}

/// Progress during ledger decoding: one unit per `records_per_step` decoded
/// records above [`DECODE_START`], never reaching `ceiling`'s successor.
pub fn decode_progress(records: usize, records_per_step: usize, ceiling: u8) -> u8 {
    let steps = records / records_per_step.max(1);
    let value = DECODE_START as usize + steps;
    value.min(ceiling as usize) as u8
}
