// File I/O for reconciliation runs

pub mod csv;
pub mod reconcile;
pub mod xlsx;

use std::path::Path;

use tallyjoin_recon::model::ReconTable;

pub use reconcile::{inspect_ledger, reconcile_files};

/// Supported output file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    /// Case-insensitive extension lookup. Anything but `.xlsx` / `.csv` is an error.
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("csv") => Ok(Self::Csv),
            Some(other) => Err(format!("unsupported output format '.{other}' (expected .xlsx or .csv)")),
            None => Err(format!("output path '{}' has no extension (expected .xlsx or .csv)", path.display())),
        }
    }
}

/// Write the table in the format implied by `path`. Returns data rows written.
pub fn write_table(table: &ReconTable, path: &Path) -> Result<usize, String> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Xlsx => {
            let result = xlsx::export_table(table, path)?;
            log::info!(
                "wrote {} rows ({} cells) to {} in {} ms",
                result.rows_exported,
                result.cells_exported,
                path.display(),
                result.export_duration_ms
            );
            Ok(result.rows_exported)
        }
        OutputFormat::Csv => {
            let rows = csv::export_table(table, path)?;
            log::info!("wrote {} rows to {}", rows, path.display());
            Ok(rows)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tallyjoin_recon::config::ColumnSet;

    #[test]
    fn test_output_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.xlsx")), Ok(OutputFormat::Xlsx));
        assert_eq!(OutputFormat::from_path(Path::new("OUT.CSV")), Ok(OutputFormat::Csv));
        assert!(OutputFormat::from_path(Path::new("out.xls")).unwrap_err().contains(".xls"));
        assert!(OutputFormat::from_path(Path::new("out")).is_err());
    }

    #[test]
    fn test_write_table_dispatches() {
        let dir = tempfile::tempdir().unwrap();
        let table = ReconTable { columns: ColumnSet::Standard, rows: Vec::new() };

        let csv_path: PathBuf = dir.path().join("empty.csv");
        assert_eq!(write_table(&table, &csv_path).unwrap(), 0);
        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert!(content.starts_with("Transaction Date,"));

        let xlsx_path = dir.path().join("empty.xlsx");
        assert_eq!(write_table(&table, &xlsx_path).unwrap(), 0);
        assert!(xlsx_path.exists());

        assert!(write_table(&table, &dir.path().join("out.txt")).is_err());
        assert!(!dir.path().join("out.txt").exists());
    }
}
