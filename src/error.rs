//! Crate-wide error type.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the data source, the table pipeline, and exports.
#[derive(Error, Debug)]
pub enum Error {
    /// The data source rejected a request. Retry-eligible; never fatal.
    #[error("failed to fetch {what}: {reason}")]
    Fetch { what: &'static str, reason: String },

    #[error("unknown machine: {0}")]
    UnknownMachine(String),

    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("date range of {days} days is longer than the {max}-day limit")]
    DateRangeTooLong { days: i64, max: i64 },

    #[error("invalid sort field: {0}")]
    InvalidSortField(String),

    #[error("invalid sort direction: {0}")]
    InvalidSortDirection(String),

    #[error("invalid page size: {0} (must be > 0)")]
    InvalidPageSize(usize),

    #[error("page size {size} is not one of the offered sizes {offered:?}")]
    PageSizeNotOffered { size: usize, offered: Vec<usize> },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("export directory not found: {0}")]
    ExportDirNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Whether the triggering action may simply be re-issued by the user.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Fetch { .. } | Error::Io(_))
    }

    /// Message suitable for display next to the view that failed.
    pub fn user_message(&self) -> String {
        match self {
            Error::Fetch { what, .. } => {
                format!("Failed to load {what}. Please try again later.")
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_are_retryable_with_friendly_message() {
        let err = Error::Fetch {
            what: "report data",
            reason: "timeout".into(),
        };
        assert!(err.is_retryable());
        assert_eq!(
            err.user_message(),
            "Failed to load report data. Please try again later."
        );
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        let err = Error::InvalidSortField("bogus".into());
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "invalid sort field: bogus");
    }
}
