// Bank export reading and CSV output of the reconciled table

use std::io::Read;
use std::path::Path;

use tallyjoin_recon::model::{format_cents, OutputCell, ReconTable};

/// Read a text file, decoding UTF-8 or falling back to Windows-1252.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Bank portals commonly export in the Excel ANSI code page
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Render one output cell as CSV text.
pub fn cell_text(cell: &OutputCell) -> String {
    match cell {
        OutputCell::Blank => String::new(),
        OutputCell::Text(s) => s.clone(),
        OutputCell::Date(d) => d.format("%Y-%m-%d").to_string(),
        OutputCell::Money(cents) => format_cents(*cents),
        OutputCell::Value(v) => v.to_string(),
    }
}

/// Write the table as comma-separated text: header row, then one line per row.
/// Returns the number of data rows written.
pub fn export_table(table: &ReconTable, path: &Path) -> Result<usize, String> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| e.to_string())?;

    writer.write_record(table.headers()).map_err(|e| e.to_string())?;
    for row in &table.rows {
        let record: Vec<String> = table.cells(row).iter().map(cell_text).collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(table.len())
}
