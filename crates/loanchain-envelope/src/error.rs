//! Error types for key derivation and envelope encryption.

use thiserror::Error;

/// Errors that can occur while deriving, wrapping or opening keys.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Empty password supplied to key derivation.
    #[error("password must not be empty")]
    EmptyPassword,

    /// Iteration count of zero.
    #[error("iteration count must be positive")]
    ZeroIterations,

    /// Tag mismatch, wrong key, corrupt ciphertext or a malformed unwrapped key.
    ///
    /// Deliberately carries no detail: callers must not be able to tell a
    /// wrong password from corrupt data.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The cipher refused to encrypt.
    #[error("encryption error: {0}")]
    EncryptionError(String),

    /// Malformed input caught by the core types.
    #[error(transparent)]
    Validation(#[from] loanchain_core::ValidationError),
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;
