//! # Loanchain Core
//!
//! Pure primitives for the loan ledger: identifiers, statuses, records and
//! the hash chain that links them.
//!
//! This crate contains no I/O, no storage, no encryption. It is pure
//! computation over the record data structures.
//!
//! ## Key Types
//!
//! - [`LoanRecord`] - One immutable entry per status transition
//! - [`LinkHash`] - SHA-256 link between a record and its predecessor
//! - [`LoanId`] - Opaque random identifier of a chain
//! - [`LoanStatus`] - The status state machine
//!
//! ## Hash Chain
//!
//! The link hash preimage is a fixed `|`-joined field list. See [`chain`].

pub mod chain;
pub mod clock;
pub mod error;
pub mod record;
pub mod status;
pub mod types;

pub use chain::{compute_hash, verify_chain, verify_chain_detailed};
pub use clock::{format_timestamp, Clock, FixedClock, SystemClock, TIMESTAMP_FORMAT};
pub use error::{ChainViolation, ValidationError};
pub use record::{
    Intermediary, LoanRecord, Parties, Principal, PrincipalRole, RecordBuilder, SealedMetadata,
    GENESIS_SEQ,
};
pub use status::LoanStatus;
pub use types::{
    IntermediaryId, LinkHash, LoanId, LoanIdWidth, Nonce, PrincipalId, Salt, HASH_LEN, NONCE_LEN,
    SALT_LEN,
};
