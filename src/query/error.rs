use crate::parser::FieldKind;
use thiserror::Error;

/// Errors that can occur while parsing or evaluating a query
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Syntax error at token {position} ('{token}'): {message}")]
    Syntax {
        position: usize,
        token: String,
        message: String,
    },

    #[error("Invalid field name '{0}'. Valid fields are: ip, datetime, method, url, version, status, size, referrer, user_agent")]
    UnknownField(String),

    #[error("Cannot compare field '{field}' with '{literal}': expected {expected}")]
    Coercion {
        field: String,
        literal: String,
        expected: FieldKind,
    },

    /// A glob too large for the regex engine's compiled size limit
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl QueryError {
    pub(crate) fn syntax(position: usize, token: impl Into<String>, message: &str) -> Self {
        QueryError::Syntax {
            position,
            token: token.into(),
            message: message.to_string(),
        }
    }
}

/// A literal that does not convert to the compared field's type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("'{literal}' is not {expected}")]
pub struct CoercionError {
    pub literal: String,
    pub expected: FieldKind,
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
