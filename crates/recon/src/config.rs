use serde::Deserialize;

use crate::cell::col_from_letters;
use crate::error::ReconError;

/// Tag literal marking a description that carries an account id.
pub const DEFAULT_TAG: &str = "TXEFILE";
/// Prefix stripped from a tagged description.
pub const DEFAULT_STRIP_PREFIX: &str = "TXEFILE*0";
/// Suffix stripped from a tagged description.
pub const DEFAULT_STRIP_SUFFIX: &str = "-0";
/// Required account id length, in characters.
pub const DEFAULT_ID_LEN: usize = 8;
/// Header search window (rows 1..=N).
pub const DEFAULT_SCAN_ROWS: u32 = 50;
/// Rows between successive ledger records.
pub const DEFAULT_STRIDE: u32 = 3;
/// Runaway-iteration bound for the ledger read cursor.
pub const DEFAULT_MAX_READ_ROW: u32 = 1_000_000;
/// Decoded records per unit of progress.
pub const DEFAULT_RECORDS_PER_STEP: usize = 5;
/// Progress never passes this value while the ledger is being decoded.
pub const DEFAULT_DECODE_CEILING: u8 = 90;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub bank: BankConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub join: JoinConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

// ---------------------------------------------------------------------------
// Identifier extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ExtractConfig {
    pub tag: String,
    pub strip_prefix: String,
    pub strip_suffix: String,
    pub id_len: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.into(),
            strip_prefix: DEFAULT_STRIP_PREFIX.into(),
            strip_suffix: DEFAULT_STRIP_SUFFIX.into(),
            id_len: DEFAULT_ID_LEN,
        }
    }
}

// ---------------------------------------------------------------------------
// Bank export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BankConfig {
    pub columns: BankColumns,
    /// chrono format strings, tried in order.
    pub date_formats: Vec<String>,
    /// Fail the run on a date or amount that does not parse instead of
    /// passing the text through.
    pub strict: bool,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            columns: BankColumns::default(),
            date_formats: vec!["%m/%d/%Y".into(), "%Y-%m-%d".into()],
            strict: false,
        }
    }
}

/// Header names of the required bank export columns.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BankColumns {
    pub transaction_date: String,
    pub post_date: String,
    pub description: String,
    pub amount: String,
    pub memo: String,
}

impl Default for BankColumns {
    fn default() -> Self {
        Self {
            transaction_date: "Transaction Date".into(),
            post_date: "Post Date".into(),
            description: "Description".into(),
            amount: "Amount".into(),
            memo: "Memo".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LedgerConfig {
    pub header_label: String,
    pub header_column: String,
    pub scan_rows: u32,
    pub stride: u32,
    pub max_read_row: u32,
    /// Rows below the id row holding the record description.
    pub description_offset: u32,
    pub columns: LedgerColumns,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            header_label: "ID".into(),
            header_column: "A".into(),
            scan_rows: DEFAULT_SCAN_ROWS,
            stride: DEFAULT_STRIDE,
            max_read_row: DEFAULT_MAX_READ_ROW,
            description_offset: 2,
            columns: LedgerColumns::default(),
        }
    }
}

/// Column letters of each ledger field.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LedgerColumns {
    pub account_id: String,
    pub submission_date: String,
    pub acceptance_date: String,
    pub cause_number: String,
    pub matter_number: String,
    pub description: String,
}

impl Default for LedgerColumns {
    fn default() -> Self {
        Self {
            account_id: "A".into(),
            submission_date: "B".into(),
            acceptance_date: "C".into(),
            cause_number: "D".into(),
            matter_number: "E".into(),
            description: "D".into(),
        }
    }
}

/// Ledger column letters resolved to indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub header: u32,
    pub account_id: u32,
    pub submission_date: u32,
    pub acceptance_date: u32,
    pub cause_number: u32,
    pub matter_number: u32,
    pub description: u32,
}

impl LedgerConfig {
    pub fn resolve_columns(&self) -> Result<ResolvedColumns, ReconError> {
        let col = |field: &str, letters: &str| -> Result<u32, ReconError> {
            col_from_letters(letters).ok_or_else(|| {
                ReconError::ConfigValidation(format!(
                    "ledger.{field}: '{letters}' is not a column letter"
                ))
            })
        };
        let c = &self.columns;
        Ok(ResolvedColumns {
            header: col("header_column", &self.header_column)?,
            account_id: col("columns.account_id", &c.account_id)?,
            submission_date: col("columns.submission_date", &c.submission_date)?,
            acceptance_date: col("columns.acceptance_date", &c.acceptance_date)?,
            cause_number: col("columns.cause_number", &c.cause_number)?,
            matter_number: col("columns.matter_number", &c.matter_number)?,
            description: col("columns.description", &c.description)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Join + Output + Progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct JoinConfig {
    pub kind: JoinKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    /// Every bank row is kept; ledger fields are absent when unmatched.
    #[default]
    Left,
    /// Only bank rows with a ledger match are kept.
    Inner,
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Inner => write!(f, "inner"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    pub columns: ColumnSet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSet {
    #[default]
    Standard,
    /// Standard columns plus submission and acceptance dates.
    Dated,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProgressConfig {
    pub records_per_step: usize,
    pub decode_ceiling: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            records_per_step: DEFAULT_RECORDS_PER_STEP,
            decode_ceiling: DEFAULT_DECODE_CEILING,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let invalid = |msg: String| Err(ReconError::ConfigValidation(msg));

        if self.extract.tag.is_empty() {
            return invalid("extract.tag must not be empty".into());
        }
        if self.extract.id_len == 0 {
            return invalid("extract.id_len must be at least 1".into());
        }
        if self.bank.date_formats.is_empty() {
            return invalid("bank.date_formats needs at least one format".into());
        }

        let ledger = &self.ledger;
        if ledger.header_label.is_empty() {
            return invalid("ledger.header_label must not be empty".into());
        }
        if ledger.scan_rows == 0 {
            return invalid("ledger.scan_rows must be at least 1".into());
        }
        if ledger.stride == 0 {
            return invalid("ledger.stride must be at least 1".into());
        }
        if ledger.description_offset >= ledger.stride {
            return invalid(format!(
                "ledger.description_offset ({}) must be less than ledger.stride ({})",
                ledger.description_offset, ledger.stride
            ));
        }
        if ledger.max_read_row <= ledger.stride {
            return invalid(format!(
                "ledger.max_read_row ({}) must be greater than ledger.stride ({})",
                ledger.max_read_row, ledger.stride
            ));
        }
        ledger.resolve_columns()?;

        if self.progress.records_per_step == 0 {
            return invalid("progress.records_per_step must be at least 1".into());
        }
        if !(30..99).contains(&self.progress.decode_ceiling) {
            return invalid(format!(
                "progress.decode_ceiling must be in 30..99, got {}",
                self.progress.decode_ceiling
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
