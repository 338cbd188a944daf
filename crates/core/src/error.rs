use piiguard_common::error::{CommonError, ErrorSeverity};
use piiguard_common::{impl_error_classification, impl_error_conversion};
use piiguard_domain::PiiCategory;
use thiserror::Error;

/// Errors raised by detection, policy evaluation and document loading
#[derive(Debug, Error)]
pub enum PiiError {
    // Configuration, serialization and I/O failures
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("Input of {len} bytes exceeds the maximum of {max} bytes")]
    InputTooLarge { len: usize, max: usize },

    #[error("Input text is empty")]
    EmptyInput,

    #[error("Pattern compilation error for category '{category}': {message}")]
    PatternCompilation { category: PiiCategory, message: String },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

pub type PiiResult<T> = Result<T, PiiError>;

impl PiiError {
    pub(crate) fn compilation(category: &PiiCategory, err: &regex::Error) -> Self {
        Self::PatternCompilation { category: category.clone(), message: err.to_string() }
    }
}

// Auto-convert std types via CommonError
impl_error_conversion!(PiiError, Common);

// Every failure here is caller input or configuration; nothing is transient.
impl_error_classification!(PiiError, Common,
    Self::InputTooLarge { .. } => {
        retryable: false,
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::EmptyInput => {
        retryable: false,
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::PatternCompilation { .. } => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    },
    Self::UnknownOperation(_) => {
        retryable: false,
        severity: ErrorSeverity::Warning,
        critical: false,
    }
);

impl From<PiiError> for CommonError {
    fn from(err: PiiError) -> Self {
        match err {
            PiiError::Common(e) => e,
            PiiError::InputTooLarge { len, max } => CommonError::validation_with_value(
                "text",
                format!("input exceeds maximum length of {max} bytes"),
                len.to_string(),
            ),
            PiiError::EmptyInput => CommonError::validation("text", "input is empty"),
            PiiError::PatternCompilation { category, message } => {
                CommonError::config_field(format!("patterns.{category}"), message)
            }
            PiiError::UnknownOperation(op) => {
                CommonError::validation_with_value("operation", "unknown operation", op)
            }
        }
    }
}
