// Ledger spreadsheet import (xlsx, xlsm, xls, xlsb, ods) and table export (xlsx only)
//
// Import: first worksheet only, converted to the engine's sparse cell grid.
// Export: one "Reconciliation" sheet with typed cells (real dates, numeric amounts).

use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use tallyjoin_recon::cell::{CellValue, Grid};
use tallyjoin_recon::model::{OutputCell, ReconTable};

/// Output worksheet name.
pub const SHEET_NAME: &str = "Reconciliation";

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const MONEY_FORMAT: &str = "0.00";

/// Result of reading the first worksheet of a ledger file
#[derive(Debug)]
pub struct ImportResult {
    pub grid: Grid,
    /// Name of the sheet that was read
    pub sheet_name: String,
    /// Other sheets in the workbook, ignored
    pub sheets_skipped: usize,
    pub cells_imported: usize,
    pub dates_imported: usize,
    pub import_duration_ms: u128,
}

/// Read the first worksheet into a [`Grid`].
pub fn import_first_sheet(path: &Path) -> Result<ImportResult, String> {
    let start_time = Instant::now();

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open spreadsheet: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| "Spreadsheet contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut grid = Grid::new();
    let mut dates_imported = 0;

    // Range start offset (data may not begin at A1)
    let (data_start_row, data_start_col) = range.start().unwrap_or((0, 0));

    for (row_idx, row) in range.rows().enumerate() {
        // Grid rows are 1-based
        let target_row = data_start_row + row_idx as u32 + 1;

        for (col_idx, cell) in row.iter().enumerate() {
            let target_col = data_start_col + col_idx as u32;

            let value = match cell {
                Data::Empty => continue,
                Data::String(s) => CellValue::from(s.as_str()),
                Data::Float(n) => CellValue::Number(*n),
                Data::Int(n) => CellValue::Number(*n as f64),
                Data::Bool(b) => CellValue::Bool(*b),
                Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
                Data::DateTime(dt) => {
                    // 1900 date system assumed; calamine does not expose the 1904 flag
                    match serial_to_datetime(dt.as_f64()) {
                        Some(value) => {
                            dates_imported += 1;
                            CellValue::DateTime(value)
                        }
                        None => CellValue::Number(dt.as_f64()),
                    }
                }
                Data::DateTimeIso(s) => CellValue::from(s.as_str()),
                Data::DurationIso(s) => CellValue::from(s.as_str()),
            };
            grid.set(target_row, target_col, value);
        }
    }

    if sheet_names.len() > 1 {
        log::debug!(
            "{}: reading '{}', ignoring {} other sheet(s)",
            path.display(),
            sheet_name,
            sheet_names.len() - 1
        );
    }

    Ok(ImportResult {
        cells_imported: grid.len(),
        grid,
        sheet_name,
        sheets_skipped: sheet_names.len().saturating_sub(1),
        dates_imported,
        import_duration_ms: start_time.elapsed().as_millis(),
    })
}

/// Excel serial day number to a date-time. Serial 1 is 1900-01-01; serial 60 is
/// Excel's phantom 1900-02-29, mapped to 1900-03-01.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = if serial < 61.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_days(days)?)?
        .checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

/// Date-time to Excel serial. Only meaningful from 1900-03-01 onwards.
pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let delta = dt - epoch;
    delta.num_seconds() as f64 / 86_400.0
}

pub fn date_to_serial(date: NaiveDate) -> f64 {
    datetime_to_serial(date.and_time(chrono::NaiveTime::MIN))
}

/// Result of an xlsx export
#[derive(Debug, Default)]
pub struct ExportResult {
    pub rows_exported: usize,
    pub cells_exported: usize,
    pub export_duration_ms: u128,
}

/// Export the table to a single-sheet xlsx workbook.
///
/// Header row is bold and frozen. Dates are written as date serials with a
/// `yyyy-mm-dd` format, amounts as numbers with two decimals. Absent ledger
/// fields are left as blank cells.
pub fn export_table(table: &ReconTable, path: &Path) -> Result<ExportResult, String> {
    let start_time = Instant::now();
    let mut result = ExportResult::default();

    let mut xlsx_workbook = XlsxWorkbook::new();
    let worksheet = xlsx_workbook
        .add_worksheet()
        .set_name(SHEET_NAME)
        .map_err(|e| format!("Failed to create sheet '{}': {}", SHEET_NAME, e))?;

    let formats = CellFormats::new();

    for (col, header) in table.headers().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &formats.header)
            .map_err(|e| format!("Failed to write header: {}", e))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("Failed to freeze header row: {}", e))?;

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, cell) in table.cells(row).iter().enumerate() {
            if write_cell(worksheet, row32, col as u16, cell, &formats)? {
                result.cells_exported += 1;
            }
        }
        result.rows_exported += 1;
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet
            .set_column_width(col as u16, width)
            .map_err(|e| format!("Failed to set column width: {}", e))?;
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    result.export_duration_ms = start_time.elapsed().as_millis();
    Ok(result)
}

struct CellFormats {
    header: Format,
    date: Format,
    datetime: Format,
    money: Format,
}

impl CellFormats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format(DATE_FORMAT),
            datetime: Format::new().set_num_format(DATETIME_FORMAT),
            money: Format::new().set_num_format(MONEY_FORMAT),
        }
    }
}

/// Write one typed cell. Returns false when nothing was written (blank).
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &OutputCell,
    formats: &CellFormats,
) -> Result<bool, String> {
    let written = match cell {
        OutputCell::Blank => return Ok(false),
        OutputCell::Text(s) => worksheet.write_string(row, col, s),
        OutputCell::Date(d) => worksheet.write_number_with_format(row, col, date_to_serial(*d), &formats.date),
        OutputCell::Money(cents) => {
            worksheet.write_number_with_format(row, col, *cents as f64 / 100.0, &formats.money)
        }
        OutputCell::Value(value) => match value {
            CellValue::Empty => return Ok(false),
            CellValue::Text(s) => worksheet.write_string(row, col, s),
            CellValue::Number(n) => worksheet.write_number(row, col, *n),
            CellValue::Bool(b) => worksheet.write_boolean(row, col, *b),
            CellValue::DateTime(dt) => {
                let format = if dt.time() == chrono::NaiveTime::MIN {
                    &formats.date
                } else {
                    &formats.datetime
                };
                worksheet.write_number_with_format(row, col, datetime_to_serial(*dt), format)
            }
        },
    };
    written.map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
    Ok(true)
}

/// Character widths per column: widest header or text cell, clamped.
fn column_widths(table: &ReconTable) -> Vec<f64> {
    let mut widths: Vec<usize> = table.headers().iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (col, cell) in table.cells(row).iter().enumerate() {
            let len = match cell {
                OutputCell::Blank => 0,
                OutputCell::Date(_) => 10,
                other => crate::csv::cell_text(other).chars().count(),
            };
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(len);
            }
        }
    }
    widths.into_iter().map(|w| (w.clamp(8, 60) + 2) as f64).collect()
}
