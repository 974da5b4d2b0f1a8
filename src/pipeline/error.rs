//! Batch-level failures
//!
//! Per-record problems never end up here; they travel as parse flags and
//! quality issues. These are the conditions under which no dataset is
//! returned at all.

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::ConfigError;
use crate::types::SourceKind;

/// Who has to act on a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fix the input exports
    Input,
    /// Fix the configuration (rate table, reference tables)
    Configuration,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("parse failure: {0}")]
    ParseFailure(String),

    #[error("reconciliation conflict: {0}")]
    ReconciliationConflict(String),

    #[error("no contract rate covers {date} ({source_kind} row {row})")]
    MissingRateTable {
        date: NaiveDate,
        source_kind: SourceKind,
        row: usize,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::ParseFailure(_) | PipelineError::ReconciliationConflict(_) => {
                ErrorKind::Input
            }
            PipelineError::MissingRateTable { .. } | PipelineError::Config(_) => {
                ErrorKind::Configuration
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(PipelineError::ParseFailure("empty".into()).kind(), ErrorKind::Input);
        assert_eq!(
            PipelineError::ReconciliationConflict("code".into()).kind(),
            ErrorKind::Input
        );
        let missing = PipelineError::MissingRateTable {
            date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            source_kind: SourceKind::VoyageEvents,
            row: 3,
        };
        assert_eq!(missing.kind(), ErrorKind::Configuration);
        assert_eq!(
            missing.to_string(),
            "no contract rate covers 2019-01-01 (voyage events row 3)"
        );
        let config = PipelineError::from(ConfigError::Validation(vec!["bad".into()]));
        assert_eq!(config.kind(), ErrorKind::Configuration);
    }
}
