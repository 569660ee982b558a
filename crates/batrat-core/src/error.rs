//! Error taxonomy shared by the loader, the cleaner and the statistical
//! pipeline.
//!
//! Every pipeline condition is reported at the component boundary. None of
//! them is fatal to the host process: the presentation layer turns an
//! [`AnalysisError`] into an analyst-facing message via
//! [`AnalysisError::user_message`] and carries on.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::FieldKind;

/// Requested fields or input records do not fit the schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("input record set is empty")]
    EmptyInput,

    #[error("no fields were requested")]
    NoRequiredFields,

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' is not {expected}")]
    WrongKind {
        field: &'static str,
        expected: FieldKind,
    },

    #[error("record {index} has no value for '{field}'; clean the records first")]
    MissingValue { field: &'static str, index: usize },

    #[error("field '{field}' must take exactly two distinct values, found {distinct}")]
    NotBinary { field: &'static str, distinct: usize },

    #[error("invalid contingency table: {0}")]
    InvalidTable(String),
}

/// Failure of one statistical analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("degenerate contingency table: {0}")]
    DegenerateTable(String),

    #[error("singular model: {0}")]
    SingularModel(String),
}

impl AnalysisError {
    /// The sentence shown to the analyst in place of a result.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::Schema(_) => "analysis unavailable",
            AnalysisError::DegenerateTable(_) => "insufficient data for this cross-tabulation",
            AnalysisError::SingularModel(_) => {
                "model could not be estimated; check for separation or collinearity"
            }
        }
    }
}

/// Failure to read one of the two datasets.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Failure to load or validate an [`crate::config::AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_errors_surface_as_unavailable() {
        let err: AnalysisError = SchemaError::EmptyInput.into();
        assert_eq!(err.user_message(), "analysis unavailable");
    }

    #[test]
    fn user_messages_are_distinct() {
        let degenerate = AnalysisError::DegenerateTable("x".into());
        let singular = AnalysisError::SingularModel("x".into());
        assert_ne!(degenerate.user_message(), singular.user_message());
        assert!(singular.user_message().contains("separation"));
    }

    #[test]
    fn display_includes_field_name() {
        let err = SchemaError::WrongKind {
            field: "risk",
            expected: FieldKind::Continuous,
        };
        assert_eq!(err.to_string(), "field 'risk' is not continuous");
    }
}
