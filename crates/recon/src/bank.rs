use chrono::NaiveDate;

use crate::cancel::CancelToken;
use crate::config::BankConfig;
use crate::error::ReconError;
use crate::extract::{Extraction, IdExtractor};
use crate::model::{BankAmount, BankDate, BankTransaction};

/// Parse the bank export and extract account ids, preserving source order.
///
/// Any tagged description with a wrong-length id aborts the whole load. Dates
/// and amounts that do not parse are kept as text unless `strict` is set.
pub fn load_bank_transactions(
    csv_data: &str,
    config: &BankConfig,
    extractor: &IdExtractor,
    cancel: &CancelToken,
) -> Result<Vec<BankTransaction>, ReconError> {
    let csv_data = csv_data.strip_prefix('\u{feff}').unwrap_or(csv_data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReconError::MissingColumn { column: name.into() })
    };

    let col = &config.columns;
    let txn_date_idx = idx(&col.transaction_date)?;
    let post_date_idx = idx(&col.post_date)?;
    let description_idx = idx(&col.description)?;
    let amount_idx = idx(&col.amount)?;
    let memo_idx = idx(&col.memo)?;

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ReconError::Io(e.to_string()))?;

    // Ids first: a wrong-length id fails the load whatever else the export holds.
    let mut account_ids = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        cancel.check()?;
        let description = record.get(description_idx).unwrap_or("");
        account_ids.push(match extractor.extract(description) {
            Extraction::Untagged => None,
            Extraction::Id(id) => Some(id),
            Extraction::BadLength(extracted) => {
                return Err(ReconError::BankAccountLength {
                    row: i + 1,
                    description: description.to_string(),
                    extracted,
                });
            }
        });
    }

    let mut transactions = Vec::with_capacity(records.len());
    for (i, (record, account_id)) in records.iter().zip(account_ids).enumerate() {
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        transactions.push(BankTransaction {
            row,
            transaction_date: bank_date(row, field(txn_date_idx), &col.transaction_date, config)?,
            post_date: bank_date(row, field(post_date_idx), &col.post_date, config)?,
            description: field(description_idx).to_string(),
            amount: bank_amount(row, field(amount_idx), config)?,
            memo: field(memo_idx).to_string(),
            account_id,
        });
    }

    log::debug!(
        "bank export: {} rows, {} tagged",
        transactions.len(),
        transactions.iter().filter(|t| t.account_id.is_some()).count()
    );

    Ok(transactions)
}

fn bank_date(row: usize, value: &str, column: &str, config: &BankConfig) -> Result<BankDate, ReconError> {
    match parse_date(value, &config.date_formats) {
        Some(date) => Ok(BankDate::Parsed(date)),
        None if config.strict => Err(ReconError::DateParse {
            row,
            column: column.into(),
            value: value.into(),
        }),
        None => Ok(BankDate::Raw(value.to_string())),
    }
}

fn bank_amount(row: usize, value: &str, config: &BankConfig) -> Result<BankAmount, ReconError> {
    match parse_money_string(value) {
        Ok(cents) => Ok(BankAmount::Cents(cents)),
        Err(_) if config.strict => Err(ReconError::AmountParse { row, value: value.into() }),
        Err(_) => Ok(BankAmount::Raw(value.to_string())),
    }
}

fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let value = value.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Parse a decimal amount string to i64 minor units (cents), without f64.
/// Handles "1234.56", "1234.5", "1234", "-1234.56", "+12", "1,234.56".
pub fn parse_money_string(s: &str) -> Result<i64, String> {
    let s = s.trim();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let s = s.replace(',', "");
    if s.is_empty() {
        return Err("empty amount".into());
    }

    let (whole, frac) = s.split_once('.').unwrap_or((s.as_str(), ""));
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("bad amount: {s}"));
    }
    let dollars: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|e| format!("bad dollars: {e}"))?
    };
    let cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|e| format!("bad cents: {e}"))? * 10,
        2 => frac.parse().map_err(|e| format!("bad cents: {e}"))?,
        _ => return Err(format!("too many decimal places: {s}")),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(format!("bad amount: {s}"));
    }

    let minor = dollars
        .checked_mul(100)
        .and_then(|d| d.checked_add(cents))
        .ok_or_else(|| format!("amount out of range: {s}"))?;
    Ok(if negative { -minor } else { minor })
}
