//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for futfeat.
#[derive(Debug, thiserror::Error)]
pub enum FeatError {
    #[error("malformed row at line {line}: field {field} has non-numeric value {value:?}")]
    MalformedRow {
        line: usize,
        field: String,
        value: String,
    },

    #[error("unparsable date {value:?} (expected M/D/YYYY, M-D-YYYY or YYYY/MM/DD)")]
    UnparsableDate { value: String },

    /// Non-fatal: carried in the load report as a warning.
    #[error("duplicate date {date} at line {line}; keeping the first occurrence")]
    DuplicateDate { date: NaiveDate, line: usize },

    #[error("unknown column {name}")]
    UnknownColumn { name: String },

    #[error("column {name} is a raw price column and cannot be modified")]
    ReadOnlyColumn { name: String },

    #[error("column {column} has {actual} values, table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for FeatError {
    fn from(err: csv::Error) -> Self {
        FeatError::Csv {
            reason: err.to_string(),
        }
    }
}

impl From<&FeatError> for std::process::ExitCode {
    fn from(err: &FeatError) -> Self {
        let code: u8 = match err {
            FeatError::Io(_) | FeatError::Csv { .. } => 1,
            FeatError::ConfigParse { .. }
            | FeatError::ConfigMissing { .. }
            | FeatError::ConfigInvalid { .. } => 2,
            FeatError::MalformedRow { .. }
            | FeatError::UnparsableDate { .. }
            | FeatError::DuplicateDate { .. } => 3,
            FeatError::UnknownColumn { .. }
            | FeatError::ReadOnlyColumn { .. }
            | FeatError::LengthMismatch { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
