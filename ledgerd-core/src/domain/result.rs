//! Result and error types for the core library

use thiserror::Error;

/// Core library error type.
///
/// Business-rule variants are returned verbatim to the caller so the front
/// end can map them to transport codes; `Database` and `Conflict` are the
/// only variants a caller may safely retry.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Account not available")]
    NotAvailable,

    #[error("Destination account not available")]
    ToAccountNotAvailable,

    #[error("Balance insufficient")]
    BalanceInsufficient,

    #[error("Transfer to same account")]
    TransferToSameAccount,

    #[error("Currency mismatch")]
    CurrencyMismatch,

    /// A concurrent writer changed the row since it was read.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// True for infrastructure failures that a caller may retry without
    /// risking a duplicate side effect. Business-rule rejections are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Conflict(_))
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classes() {
        assert!(Error::database("connection reset").is_retryable());
        assert!(Error::conflict("stale account version").is_retryable());
        assert!(!Error::BalanceInsufficient.is_retryable());
        assert!(!Error::validation("bad amount").is_retryable());
        assert!(!Error::not_found("account").is_retryable());
    }
}
