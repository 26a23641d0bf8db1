//! Error types for class-imbalance analysis.

use thiserror::Error;

/// Minimum number of distinct classes an analysis needs.
pub const MIN_CLASSES: usize = 2;

/// Caller-correctable problems with the input table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The target column is not among the dataset's columns.
    #[error("target column '{column}' was not found in the dataset")]
    MissingColumn { column: String },

    /// The target column holds fewer than [`MIN_CLASSES`] distinct values.
    #[error(
        "target column '{column}' must contain at least {min} distinct classes \
         for analysis (found {found})",
        min = MIN_CLASSES
    )]
    InsufficientClasses { column: String, found: usize },
}

/// Everything `analyze` can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Input that passed validation but cannot be analysed, e.g. a row with
    /// no usable target value.
    #[error("unexpected input: {reason}")]
    Unexpected { reason: String },
}

impl AnalysisError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AnalysisError::Validation(_))
    }

    pub fn unexpected(reason: impl Into<String>) -> Self {
        AnalysisError::Unexpected {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_column() {
        let err = ValidationError::MissingColumn {
            column: "Class".into(),
        };
        assert_eq!(
            err.to_string(),
            "target column 'Class' was not found in the dataset"
        );

        let err = ValidationError::InsufficientClasses {
            column: "label".into(),
            found: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("'label'"));
        assert!(msg.contains("at least 2 distinct classes"));
    }

    #[test]
    fn validation_errors_convert_transparently() {
        let err: AnalysisError = ValidationError::MissingColumn {
            column: "Class".into(),
        }
        .into();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("target column"));
        assert!(!AnalysisError::unexpected("boom").is_validation());
    }
}
