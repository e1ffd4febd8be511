use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort an analysis run. None of them are recoverable per line.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("malformed record at {}:{line_number}: expected {expected} fields, found {found}: {line:?}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line_number: usize,
        expected: usize,
        found: usize,
        line: String,
    },

    #[error("cannot convert field '{field}' value {value:?}: {reason}")]
    FieldConversion {
        field: String,
        value: String,
        reason: String,
    },

    #[error("url key '{key}' has byte statistics but no request statistics")]
    Consistency { key: String },
}

impl AnalysisError {
    pub fn conversion(field: &str, value: &str, reason: impl ToString) -> Self {
        Self::FieldConversion {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// A running total that would leave the `i64` range once `value` is added.
    pub fn overflow(field: &str, value: i64) -> Self {
        Self::conversion(field, &value.to_string(), "overflow")
    }

    pub fn missing_field(field: &str) -> Self {
        Self::conversion(field, "", "field not present in record")
    }

    /// Attaches the source location to a `MalformedRecord`; other kinds pass through.
    pub fn at(self, source: &std::path::Path, number: usize) -> Self {
        match self {
            Self::MalformedRecord {
                expected,
                found,
                line,
                ..
            } => Self::MalformedRecord {
                path: source.to_path_buf(),
                line_number: number,
                expected,
                found,
                line,
            },
            other => other,
        }
    }
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
