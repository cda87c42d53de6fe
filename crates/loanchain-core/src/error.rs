//! Error types for the ledger core.

use thiserror::Error;

/// Validation errors for caller input and record structure.
///
/// Every variant is raised before any state is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("status {0} can only be set by chain creation")]
    ReservedStatus(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("malformed loan id: {0}")]
    MalformedLoanId(String),

    #[error("salt must be exactly 16 bytes, got {0}")]
    InvalidSaltLength(usize),

    #[error("nonce must be exactly 12 bytes, got {0}")]
    InvalidNonceLength(usize),

    #[error("malformed hash: {0}")]
    MalformedHash(String),

    #[error("principal {id} has role {actual}, expected {expected}")]
    WrongRole {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// The first rule a chain of records breaks, as found by
/// [`verify_chain_detailed`](crate::chain::verify_chain_detailed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainViolation {
    #[error("chain is empty")]
    Empty,

    #[error("genesis record does not point at the zero sentinel")]
    GenesisNotAnchored,

    #[error("genesis record has status {0}, expected initiated")]
    GenesisStatus(String),

    #[error("record at index {index} has status initiated")]
    Reinitiated { index: usize },

    #[error("invalid sequence at index {index}: expected {expected}, got {got}")]
    InvalidSequence { index: usize, expected: u64, got: u64 },

    #[error("record at index {index} belongs to a different loan")]
    MixedLoans { index: usize },

    #[error("hash mismatch at index {index}: stored {stored}, computed {computed}")]
    HashMismatch {
        index: usize,
        stored: String,
        computed: String,
    },

    #[error("broken link at index {index}: previous hash does not match predecessor")]
    BrokenLink { index: usize },

    #[error("record at index {index} carries different metadata than genesis")]
    MetadataDrift { index: usize },
}
