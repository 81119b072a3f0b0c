use std::path::PathBuf;

use chrono::NaiveDate;
use tallyjoin_recon::config::{ColumnSet, JoinKind};
use tallyjoin_recon::model::ReconStatus;
use tallyjoin_recon::{
    reconcile, try_reconcile, CancelToken, ReconError, CellValue, Grid, NoProgress, OutputCell, ReconConfig, ReconOutcome,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn bank_csv() -> String {
    std::fs::read_to_string(fixtures_dir().join("bank.csv")).unwrap()
}

/// Preamble, "ID" header at row 5, three records (one duplicate id), then a gap.
fn ledger_sheet() -> Grid {
    let mut grid = Grid::new();
    grid.set_a1("A1", "Trust Account Reconciliation");
    grid.set_a1("A2", "Period ending 01/31/2020");
    grid.set_a1("A5", "ID");
    grid.set_a1("B5", "Submitted");
    grid.set_a1("D5", "Cause / Description");

    grid.set_a1("A6", "12345678");
    grid.set_a1("B6", "01/02/2020");
    grid.set_a1("C6", "01/03/2020");
    grid.set_a1("D6", "CV-2020-0001");
    grid.set_a1("E6", 4411.0);
    grid.set_a1("D8", "Original petition filing fee");

    grid.set_a1("A9", "87654321");
    grid.set_a1("D9", "CV-2020-0002");
    grid.set_a1("E9", 4412.0);
    grid.set_a1("D11", "Service of citation");

    grid.set_a1("A12", "87654321");
    grid.set_a1("D12", "CV-2020-0099");
    grid.set_a1("D14", "Duplicate entry");
    grid
}

fn run(bank: &str, sheet: &Grid, config: &ReconConfig) -> ReconOutcome {
    reconcile(bank, sheet, config, &mut NoProgress, &CancelToken::new())
}

// -------------------------------------------------------------------------
// End-to-end
// -------------------------------------------------------------------------

#[test]
fn single_tagged_row_fully_populated() {
    let bank = "\
Transaction Date,Post Date,Description,Amount,Memo
01/02/2020,01/03/2020,TXEFILE*012345678-0,-25.00,
";
    let mut sheet = Grid::new();
    sheet.set_a1("A5", "ID");
    sheet.set_a1("A6", "12345678");
    sheet.set_a1("D6", "CV-1");
    sheet.set_a1("E6", "M-1");
    sheet.set_a1("D8", "Filing fee");

    let outcome = run(bank, &sheet, &ReconConfig::default());
    assert_eq!(outcome.status, ReconStatus::Success);

    let table = outcome.table.unwrap();
    assert_eq!(table.len(), 1);
    let cells = table.cells(&table.rows[0]);
    assert_eq!(
        cells,
        vec![
            OutputCell::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()),
            OutputCell::Date(NaiveDate::from_ymd_opt(2020, 1, 3).unwrap()),
            OutputCell::Text("TXEFILE*012345678-0".into()),
            OutputCell::Money(-2500),
            OutputCell::Blank,
            OutputCell::Text("12345678".into()),
            OutputCell::Value(CellValue::Text("CV-1".into())),
            OutputCell::Value(CellValue::Text("M-1".into())),
            OutputCell::Value(CellValue::Text("Filing fee".into())),
        ]
    );

    let summary = outcome.summary.unwrap();
    assert_eq!(summary.header_row, 5);
    assert_eq!(summary.start_row, 6);
    assert_eq!(summary.matched, 1);
}

#[test]
fn left_join_keeps_bank_order_and_unmatched_rows() {
    let outcome = run(&bank_csv(), &ledger_sheet(), &ReconConfig::default());
    assert_eq!(outcome.status, ReconStatus::Success);

    let table = outcome.table.unwrap();
    assert_eq!(table.columns, ColumnSet::Standard);
    let rows: Vec<usize> = table.rows.iter().map(|r| r.bank.row).collect();
    assert_eq!(rows, vec![1, 2, 3, 4]);

    assert_eq!(table.rows[0].ledger.as_ref().unwrap().row, 6);
    assert!(table.rows[1].ledger.is_none());
    assert!(table.rows[1].bank.account_id.is_none());
    // Duplicate id at row 12 is ignored in favour of row 9.
    let third = table.rows[2].ledger.as_ref().unwrap();
    assert_eq!(third.row, 9);
    assert_eq!(third.cause_number, CellValue::Text("CV-2020-0002".into()));
    assert_eq!(third.description, CellValue::Text("Service of citation".into()));
    assert!(table.rows[3].ledger.is_none());

    let unmatched = table.cells(&table.rows[3]);
    assert_eq!(unmatched.len(), 9);
    assert_eq!(unmatched[5], OutputCell::Text("AAAA0000".into()));
    assert!(unmatched[6..].iter().all(|c| *c == OutputCell::Blank));

    let summary = outcome.summary.unwrap();
    assert_eq!(summary.bank_rows, 4);
    assert_eq!(summary.tagged_rows, 3);
    assert_eq!(summary.ledger_records, 3);
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.unmatched, 2);
    assert_eq!(summary.duplicate_ledger_ids, 1);
    assert_eq!(summary.output_rows, 4);
    assert_eq!(summary.join, JoinKind::Left);
}

#[test]
fn inner_join_with_dated_columns_from_config_file() {
    let toml = std::fs::read_to_string(fixtures_dir().join("dated-inner.recon.toml")).unwrap();
    let config = ReconConfig::from_toml(&toml).unwrap();

    let outcome = run(&bank_csv(), &ledger_sheet(), &config);
    assert_eq!(outcome.status, ReconStatus::Success);

    let table = outcome.table.unwrap();
    assert_eq!(table.headers().len(), 11);
    assert_eq!(table.len(), 2);

    let cells = table.cells(&table.rows[0]);
    assert_eq!(cells[9], OutputCell::Value(CellValue::Text("01/02/2020".into())));
    assert_eq!(cells[10], OutputCell::Value(CellValue::Text("01/03/2020".into())));
    // Row 9 has no dates.
    let cells = table.cells(&table.rows[1]);
    assert_eq!(cells[9], OutputCell::Blank);

    let summary = outcome.summary.unwrap();
    assert_eq!(summary.output_rows, 2);
    assert_eq!(summary.unmatched, 2);
}

// -------------------------------------------------------------------------
// Failure statuses
// -------------------------------------------------------------------------

#[test]
fn bad_bank_id_fails_whole_run() {
    let bank = format!("{}01/10/2020,01/11/2020,TXEFILE*0123456789-0,-1.00,\n", bank_csv());
    let outcome = run(&bank, &ledger_sheet(), &ReconConfig::default());
    assert_eq!(outcome.status, ReconStatus::FailBankAcctLen);
    assert!(outcome.table.is_none());
}

#[test]
fn header_window_edges() {
    let bank = "Transaction Date,Post Date,Description,Amount,Memo\n";

    let mut sheet = Grid::new();
    sheet.set(50, 0, "ID");
    assert_eq!(run(bank, &sheet, &ReconConfig::default()).status, ReconStatus::Success);

    let mut sheet = Grid::new();
    sheet.set(51, 0, "ID");
    assert_eq!(run(bank, &sheet, &ReconConfig::default()).status, ReconStatus::FailRecoNoId);
}

#[test]
fn ledger_cell_failures() {
    let mut sheet = ledger_sheet();
    sheet.set_a1("A9", 87654321.0);
    let outcome = run(&bank_csv(), &sheet, &ReconConfig::default());
    assert_eq!(outcome.status, ReconStatus::FailRecoNoPlus3);

    let mut sheet = ledger_sheet();
    sheet.set_a1("A9", "8765432");
    let outcome = run(&bank_csv(), &sheet, &ReconConfig::default());
    assert_eq!(outcome.status, ReconStatus::FailRecoAcctLen);
    assert!(outcome.message.unwrap().contains("row 9"));
}

#[test]
fn lowered_bound_fails_large() {
    let mut config = ReconConfig::default();
    config.ledger.max_read_row = 10;
    let outcome = run(&bank_csv(), &ledger_sheet(), &config);
    assert_eq!(outcome.status, ReconStatus::FailRecoLarge);
}

#[test]
fn missing_bank_column_is_input_failure() {
    let bank = "Transaction Date,Post Date,Description,Amount\n";
    let outcome = run(bank, &ledger_sheet(), &ReconConfig::default());
    assert_eq!(outcome.status, ReconStatus::FailInput);
    assert!(outcome.message.unwrap().contains("Memo"));
}

#[test]
fn bad_bank_id_outranks_unparsed_bank_fields() {
    let bank = "\
Transaction Date,Post Date,Description,Amount,Memo
01/02/2020,,ACH PENDING,-1.00,
01/02/2020,01/03/2020,TXEFILE*01234567-0,$25.00,
";
    let outcome = run(bank, &ledger_sheet(), &ReconConfig::default());
    assert_eq!(outcome.status, ReconStatus::FailBankAcctLen);
    assert!(outcome.message.unwrap().contains("row 2"));
}

#[test]
fn pending_row_and_formatted_amount_pass_through() {
    let bank = "\
Transaction Date,Post Date,Description,Amount,Memo
01/02/2020,,ACH PENDING,-1.00,
01/02/2020,01/03/2020,TXEFILE*012345678-0,$25.00,
";
    let outcome = run(bank, &ledger_sheet(), &ReconConfig::default());
    assert_eq!(outcome.status, ReconStatus::Success);

    let table = outcome.table.unwrap();
    let pending = table.cells(&table.rows[0]);
    assert_eq!(pending[0], OutputCell::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()));
    assert_eq!(pending[1], OutputCell::Blank);
    assert_eq!(pending[3], OutputCell::Money(-100));

    let tagged = table.cells(&table.rows[1]);
    assert_eq!(tagged[3], OutputCell::Text("$25.00".into()));
    assert_eq!(tagged[6], OutputCell::Value(CellValue::Text("CV-2020-0001".into())));
}

#[test]
fn strict_bank_parsing_fails_input() {
    let bank = "\
Transaction Date,Post Date,Description,Amount,Memo
01/02/2020,,ACH PENDING,-1.00,
";
    let mut config = ReconConfig::default();
    config.bank.strict = true;
    let outcome = run(bank, &ledger_sheet(), &config);
    assert_eq!(outcome.status, ReconStatus::FailInput);
    assert!(outcome.message.unwrap().contains("Post Date"));
}

#[test]
fn cancelled_run_yields_no_table() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let outcome = reconcile(&bank_csv(), &ledger_sheet(), &ReconConfig::default(), &mut NoProgress, &cancel);
    assert_eq!(outcome.status, ReconStatus::Cancelled);
    assert!(outcome.table.is_none());
}

// -------------------------------------------------------------------------
// Progress
// -------------------------------------------------------------------------

#[test]
fn progress_is_monotonic_and_bounded() {
    let mut sheet = Grid::new();
    sheet.set(1, 0, "ID");
    for i in 0..400u32 {
        let row = 2 + i * 3;
        sheet.set(row, 0, format!("{:08}", i));
        sheet.set(row, 3, "CV");
    }

    let mut seen: Vec<u8> = Vec::new();
    let mut sink = |v: u8| seen.push(v);
    let outcome = reconcile(&bank_csv(), &sheet, &ReconConfig::default(), &mut sink, &CancelToken::new());
    assert_eq!(outcome.status, ReconStatus::Success);

    assert!(seen.windows(2).all(|w| w[0] < w[1]), "{seen:?}");
    assert!(seen.iter().all(|v| *v <= 100));
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.contains(&90));
    assert!(seen.contains(&99));
}

#[test]
fn cancel_during_decode_stops_before_join() {
    let mut sheet = Grid::new();
    sheet.set(1, 0, "ID");
    for i in 0..50u32 {
        sheet.set(2 + i * 3, 0, format!("{:08}", i));
    }

    let cancel = CancelToken::new();
    let token = cancel.clone();
    let mut seen: Vec<u8> = Vec::new();
    let mut sink = |v: u8| {
        seen.push(v);
        if v > 31 {
            token.cancel();
        }
    };
    let result = try_reconcile(&bank_csv(), &sheet, &ReconConfig::default(), &mut sink, &cancel);
    assert!(matches!(result, Err(ReconError::Cancelled)));
    assert_eq!(seen.last(), Some(&32));
    assert!(!seen.contains(&99));
    assert!(!seen.contains(&100));
}

#[test]
fn failed_run_never_reports_done() {
    let mut seen: Vec<u8> = Vec::new();
    let mut sink = |v: u8| seen.push(v);
    let outcome = reconcile(&bank_csv(), &Grid::new(), &ReconConfig::default(), &mut sink, &CancelToken::new());
    assert_eq!(outcome.status, ReconStatus::FailRecoNoId);
    assert_eq!(seen, vec![10, 15, 20]);
}

#[test]
fn outcome_serializes_status_and_summary() {
    let outcome = run(&bank_csv(), &ledger_sheet(), &ReconConfig::default());
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "SUCCESS");
    assert_eq!(json["summary"]["matched"], 2);
    assert_eq!(json["summary"]["join"], "left");
    assert!(json.get("table").is_none());
}
