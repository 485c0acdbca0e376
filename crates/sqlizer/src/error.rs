//! Error types for sqlizer

use thiserror::Error;

/// Result type alias for sqlizer operations
pub type SqlizerResult<T> = Result<T, SqlizerError>;

/// Error types for builder and executor operations
#[derive(Debug, Error)]
pub enum SqlizerError {
    /// Malformed or missing argument (empty name, empty list, empty row)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Call is legal in isolation but illegal at the current chain position
    #[error("Sequencing error: {0}")]
    Sequencing(String),

    /// Operator outside the supported set
    #[error("Unsupported operator '{operator}': {hint}")]
    UnsupportedOperator { operator: String, hint: String },

    /// Tagged value could not be coerced to the requested type
    #[error("Cannot cast '{value}' to {target}")]
    Cast { value: String, target: &'static str },

    /// Materialization attempted on an unfinishable chain
    #[error("Terminal state error: {0}")]
    TerminalState(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl SqlizerError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a sequencing error
    pub fn sequencing(message: impl Into<String>) -> Self {
        Self::Sequencing(message.into())
    }

    /// Create an unsupported-operator error with a replacement hint
    pub fn unsupported_operator(operator: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
            hint: hint.into(),
        }
    }

    /// Create a cast error
    pub fn cast(value: impl Into<String>, target: &'static str) -> Self {
        Self::Cast {
            value: value.into(),
            target,
        }
    }

    /// Check if this is a sequencing error
    pub fn is_sequencing(&self) -> bool {
        matches!(self, Self::Sequencing(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SqlizerError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::BuildError> for SqlizerError {
    fn from(err: deadpool_postgres::BuildError) -> Self {
        Self::Pool(err.to_string())
    }
}
