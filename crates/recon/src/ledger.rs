//! Ledger block location and strided record decoding.
//!
//! The reconciliation ledger is a free-form sheet: a preamble of titles and
//! notes, then a header row whose column-A cell reads `ID`, then one record
//! every three rows:
//!
//! ```text
//! row r     A: account id   B: submitted   C: accepted   D: cause no.   E: matter no.
//! row r+1   (unused)
//! row r+2                                                D: description
//! ```
//!
//! The block ends at the first stride whose id cell is empty.

use crate::cancel::CancelToken;
use crate::cell::{col_to_letters, CellSource, CellValue};
use crate::config::{LedgerConfig, ProgressConfig, ReconConfig, ResolvedColumns};
use crate::error::ReconError;
use crate::model::{LedgerBlock, LedgerRecord};
use crate::progress::{decode_progress, ProgressTracker, DECODE_START, HEADER_FOUND, HEADER_SCAN};

/// Find the header row within the scan window. First match wins.
pub fn locate_header<S: CellSource + ?Sized>(
    sheet: &S,
    config: &LedgerConfig,
) -> Result<u32, ReconError> {
    let columns = config.resolve_columns()?;
    (1..=config.scan_rows)
        .find(|&row| sheet.cell(row, columns.header).as_text() == Some(config.header_label.as_str()))
        .ok_or_else(|| ReconError::LedgerNoHeader {
            label: config.header_label.clone(),
            column: col_to_letters(columns.header),
            scan_rows: config.scan_rows,
        })
}

/// One step of the decoder state machine.
#[derive(Debug)]
enum Step {
    /// Id cell empty: the block is over.
    Done,
    /// A full record was decoded at the read row.
    Record(LedgerRecord),
}

/// Decodes the record block that starts below a located header.
pub struct LedgerDecoder<'a> {
    config: &'a LedgerConfig,
    progress: &'a ProgressConfig,
    id_len: usize,
    columns: ResolvedColumns,
}

impl<'a> LedgerDecoder<'a> {
    pub fn new(config: &'a ReconConfig) -> Result<Self, ReconError> {
        Ok(Self {
            config: &config.ledger,
            progress: &config.progress,
            id_len: config.extract.id_len,
            columns: config.ledger.resolve_columns()?,
        })
    }

    /// Walk the block from `start_row` until an empty id cell.
    ///
    /// Any invalid id cell fails the whole block; no partial record set is
    /// returned.
    pub fn decode<S: CellSource + ?Sized>(
        &self,
        sheet: &S,
        start_row: u32,
        tracker: &mut ProgressTracker<'_>,
        cancel: &CancelToken,
    ) -> Result<Vec<LedgerRecord>, ReconError> {
        let mut records = Vec::new();
        let mut read_row = start_row;

        tracker.advance_to(DECODE_START);

        loop {
            cancel.check()?;
            if read_row >= self.config.max_read_row {
                return Err(ReconError::LedgerTooLarge {
                    row: read_row,
                    limit: self.config.max_read_row,
                });
            }

            match self.step(sheet, read_row)? {
                Step::Done => break,
                Step::Record(record) => {
                    records.push(record);
                    tracker.advance_to(decode_progress(
                        records.len(),
                        self.progress.records_per_step,
                        self.progress.decode_ceiling,
                    ));
                }
            }

            read_row = read_row.saturating_add(self.config.stride);
        }

        log::debug!(
            "ledger block: {} records in rows {}..{}",
            records.len(),
            start_row,
            read_row
        );
        Ok(records)
    }

    fn step<S: CellSource + ?Sized>(&self, sheet: &S, row: u32) -> Result<Step, ReconError> {
        let c = &self.columns;
        let account_id = match sheet.cell(row, c.account_id) {
            CellValue::Empty => return Ok(Step::Done),
            CellValue::Text(s) => s,
            other => {
                return Err(ReconError::LedgerNotText {
                    row,
                    found: other.type_name(),
                })
            }
        };
        if account_id.chars().count() != self.id_len {
            return Err(ReconError::LedgerAccountLength {
                row,
                value: account_id.clone(),
            });
        }

        Ok(Step::Record(LedgerRecord {
            row,
            account_id: account_id.clone(),
            cause_number: sheet.cell(row, c.cause_number).clone(),
            matter_number: sheet.cell(row, c.matter_number).clone(),
            description: sheet
                .cell(row.saturating_add(self.config.description_offset), c.description)
                .clone(),
            submission_date: sheet.cell(row, c.submission_date).clone(),
            acceptance_date: sheet.cell(row, c.acceptance_date).clone(),
        }))
    }
}

/// Locate the header and decode the block below it.
pub fn read_ledger<S: CellSource + ?Sized>(
    sheet: &S,
    config: &ReconConfig,
    tracker: &mut ProgressTracker<'_>,
    cancel: &CancelToken,
) -> Result<LedgerBlock, ReconError> {
    tracker.advance_to(HEADER_SCAN);
    let header_row = locate_header(sheet, &config.ledger)?;
    let start_row = header_row + 1;
    tracker.advance_to(HEADER_FOUND);
    log::info!("ledger header '{}' at row {header_row}", config.ledger.header_label);

    let decoder = LedgerDecoder::new(config)?;
    let records = decoder.decode(sheet, start_row, tracker, cancel)?;
    Ok(LedgerBlock {
        header_row,
        start_row,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Grid;
    use crate::progress::NoProgress;

    fn sheet_with_header(header_row: u32) -> Grid {
        let mut grid = Grid::new();
        grid.set(1, 0, "Reconciliation Report");
        grid.set(2, 0, "Generated 2020-01-13");
        grid.set(header_row, 0, "ID");
        grid.set(header_row, 3, "Cause");
        grid
    }

    fn put_record(grid: &mut Grid, row: u32, id: &str, cause: &str, matter: f64, desc: &str) {
        grid.set(row, 0, id);
        grid.set(row, 1, "01/05/2020");
        grid.set(row, 2, "01/06/2020");
        grid.set(row, 3, cause);
        grid.set(row, 4, matter);
        grid.set(row + 2, 3, desc);
    }

    fn decode(grid: &Grid, ledger: &LedgerConfig) -> Result<LedgerBlock, ReconError> {
        let config = ReconConfig {
            ledger: ledger.clone(),
            ..ReconConfig::default()
        };
        let mut sink = NoProgress;
        let mut tracker = ProgressTracker::new(&mut sink);
        read_ledger(grid, &config, &mut tracker, &CancelToken::new())
    }

    #[test]
    fn header_found_at_first_match() {
        let mut grid = sheet_with_header(5);
        grid.set(9, 0, "ID");
        assert_eq!(locate_header(&grid, &LedgerConfig::default()).unwrap(), 5);
    }

    #[test]
    fn header_window_boundary() {
        let config = LedgerConfig::default();
        assert_eq!(locate_header(&sheet_with_header(50), &config).unwrap(), 50);

        let err = locate_header(&sheet_with_header(51), &config).unwrap_err();
        assert!(matches!(err, ReconError::LedgerNoHeader { scan_rows: 50, .. }));
    }

    #[test]
    fn header_match_is_exact() {
        let mut grid = Grid::new();
        grid.set(3, 0, "id");
        grid.set(4, 0, " ID");
        grid.set(5, 1, "ID");
        grid.set(6, 0, 1.0);
        assert!(locate_header(&grid, &LedgerConfig::default()).is_err());
    }

    #[test]
    fn decodes_strided_records_until_empty() {
        let mut grid = sheet_with_header(5);
        put_record(&mut grid, 6, "12345678", "CV-100", 7.0, "Filing fee");
        put_record(&mut grid, 9, "87654321", "CV-200", 8.0, "Service fee");
        // Data past the sentinel is never read.
        put_record(&mut grid, 15, "bad", "x", 0.0, "x");

        let block = decode(&grid, &LedgerConfig::default()).unwrap();
        assert_eq!(block.header_row, 5);
        assert_eq!(block.start_row, 6);
        assert_eq!(block.records.len(), 2);

        let first = &block.records[0];
        assert_eq!(first.row, 6);
        assert_eq!(first.account_id, "12345678");
        assert_eq!(first.cause_number, CellValue::Text("CV-100".into()));
        assert_eq!(first.matter_number, CellValue::Number(7.0));
        assert_eq!(first.description, CellValue::Text("Filing fee".into()));
        assert_eq!(first.submission_date, CellValue::Text("01/05/2020".into()));
        assert_eq!(first.acceptance_date, CellValue::Text("01/06/2020".into()));
        assert_eq!(block.records[1].row, 9);
    }

    #[test]
    fn empty_block_is_success() {
        let grid = sheet_with_header(5);
        let block = decode(&grid, &LedgerConfig::default()).unwrap();
        assert!(block.records.is_empty());
    }

    #[test]
    fn non_text_id_fails() {
        let mut grid = sheet_with_header(5);
        put_record(&mut grid, 6, "12345678", "CV-100", 7.0, "Filing fee");
        grid.set(9, 0, 12345678.0);
        let err = decode(&grid, &LedgerConfig::default()).unwrap_err();
        assert!(matches!(err, ReconError::LedgerNotText { row: 9, found: "number" }));
    }

    #[test]
    fn id_length_seven_and_nine_fail() {
        for id in ["1234567", "123456789"] {
            let mut grid = sheet_with_header(5);
            put_record(&mut grid, 6, id, "CV", 1.0, "d");
            let err = decode(&grid, &LedgerConfig::default()).unwrap_err();
            assert!(
                matches!(err, ReconError::LedgerAccountLength { row: 6, ref value } if value == id),
                "{err}"
            );
        }
    }

    #[test]
    fn runaway_bound_fails() {
        let config = LedgerConfig {
            max_read_row: 20,
            ..LedgerConfig::default()
        };
        let mut grid = sheet_with_header(1);
        for row in (2..40).step_by(3) {
            put_record(&mut grid, row, "12345678", "CV", 1.0, "d");
        }
        let err = decode(&grid, &config).unwrap_err();
        assert!(matches!(err, ReconError::LedgerTooLarge { row: 20, limit: 20 }), "{err}");
    }

    #[test]
    fn sentinel_before_bound_succeeds() {
        let config = LedgerConfig {
            max_read_row: 20,
            ..LedgerConfig::default()
        };
        let mut grid = sheet_with_header(1);
        for row in [2, 5, 8, 11, 14] {
            put_record(&mut grid, row, "12345678", "CV", 1.0, "d");
        }
        assert_eq!(decode(&grid, &config).unwrap().records.len(), 5);
    }

    #[test]
    fn custom_columns_and_stride() {
        let mut config = LedgerConfig {
            stride: 2,
            description_offset: 1,
            ..LedgerConfig::default()
        };
        config.columns.account_id = "B".into();
        config.columns.description = "C".into();

        let mut grid = sheet_with_header(3);
        grid.set(4, 1, "AAAABBBB");
        grid.set(5, 2, "first");
        grid.set(6, 1, "CCCCDDDD");
        grid.set(7, 2, "second");

        let block = decode(&grid, &config).unwrap();
        assert_eq!(block.records.len(), 2);
        assert_eq!(block.records[1].account_id, "CCCCDDDD");
        assert_eq!(block.records[1].description, CellValue::Text("second".into()));
    }

    #[test]
    fn progress_rises_and_stays_below_ceiling() {
        let mut grid = sheet_with_header(1);
        for i in 0..700u32 {
            put_record(&mut grid, 2 + i * 3, "12345678", "CV", 1.0, "d");
        }
        let mut seen = Vec::new();
        let mut sink = |v: u8| seen.push(v);
        {
            let mut tracker = ProgressTracker::new(&mut sink);
            read_ledger(&grid, &ReconConfig::default(), &mut tracker, &CancelToken::new()).unwrap();
        }
        assert_eq!(seen.first(), Some(&20));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.last(), Some(&90));
    }

    #[test]
    fn cancellation_stops_decoding() {
        let mut grid = sheet_with_header(5);
        put_record(&mut grid, 6, "12345678", "CV", 1.0, "d");
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut sink = NoProgress;
        let mut tracker = ProgressTracker::new(&mut sink);
        let err = read_ledger(&grid, &ReconConfig::default(), &mut tracker, &cancel).unwrap_err();
        assert!(matches!(err, ReconError::Cancelled));
    }

    #[test]
    fn cancellation_mid_block_stops_at_next_record() {
        let mut grid = sheet_with_header(1);
        for i in 0..20u32 {
            put_record(&mut grid, 2 + i * 3, &format!("{:08}", i), "CV", 1.0, "d");
        }
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let mut seen = Vec::new();
        let mut sink = |v: u8| {
            seen.push(v);
            if v > DECODE_START {
                token.cancel();
            }
        };
        let result = {
            let mut tracker = ProgressTracker::new(&mut sink);
            read_ledger(&grid, &ReconConfig::default(), &mut tracker, &cancel)
        };
        assert!(matches!(result, Err(ReconError::Cancelled)));
        // First decode step after 5 records, then nothing more.
        assert_eq!(seen, vec![20, 25, 30, 31]);
    }
}
