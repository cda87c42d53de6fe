//! Error types for the ledger.
//!
//! Every failure surfaces as one of five [`ErrorKind`]s so collaborators can
//! map it to a transport status without matching on internals.

use loanchain_core::ValidationError;
use loanchain_envelope::EnvelopeError;
use loanchain_store::StoreError;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or missing input. Raised before any state changes.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Unknown loan or principal.
    #[error("not found: {0}")]
    NotFound(String),

    /// Wrong password or corrupt ciphertext. Never says which.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Lost a race on a loan, or the id is already taken. Safe to retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage or runtime failure. Partial writes have been rolled back.
    #[error("internal error: {0}")]
    Internal(String),

    /// Rejected configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Invalid [`LedgerConfig`](crate::LedgerConfig) values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: cannot parse {value:?}")]
    Unparseable { var: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

/// Error categories exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AuthenticationFailure,
    Conflict,
    Internal,
}

impl LedgerError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::AuthenticationFailed => ErrorKind::AuthenticationFailure,
            LedgerError::Conflict(_) => ErrorKind::Conflict,
            LedgerError::Internal(_) | LedgerError::Config(_) => ErrorKind::Internal,
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => LedgerError::NotFound(what),
            StoreError::AlreadyExists(what) => LedgerError::Conflict(format!("{} already exists", what)),
            e @ StoreError::Conflict { .. } => LedgerError::Conflict(e.to_string()),
            e => LedgerError::Internal(e.to_string()),
        }
    }
}

impl From<EnvelopeError> for LedgerError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::EmptyPassword => {
                LedgerError::Validation(ValidationError::MissingField("password"))
            }
            EnvelopeError::Validation(v) => LedgerError::Validation(v),
            EnvelopeError::AuthenticationFailed => LedgerError::AuthenticationFailed,
            e @ (EnvelopeError::ZeroIterations | EnvelopeError::EncryptionError(_)) => {
                LedgerError::Internal(e.to_string())
            }
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_kinds() {
        let conflict: LedgerError = StoreError::Conflict {
            loan_id: "ab".into(),
            expected: 3,
            got: 2,
        }
        .into();
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert!(conflict.is_retryable());

        let missing: LedgerError = StoreError::NotFound("loan ab".into()).into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let duplicate: LedgerError = StoreError::AlreadyExists("principal a".into()).into();
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);

        let broken: LedgerError = StoreError::LockPoisoned("boom".into()).into();
        assert_eq!(broken.kind(), ErrorKind::Internal);
        assert!(!broken.is_retryable());
    }

    #[test]
    fn test_envelope_errors_map_to_kinds() {
        let auth: LedgerError = EnvelopeError::AuthenticationFailed.into();
        assert_eq!(auth.kind(), ErrorKind::AuthenticationFailure);
        assert_eq!(auth.to_string(), "authentication failed");

        let empty: LedgerError = EnvelopeError::EmptyPassword.into();
        assert_eq!(empty.kind(), ErrorKind::Validation);
    }
}
