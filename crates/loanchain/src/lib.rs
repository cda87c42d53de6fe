//! # Loanchain
//!
//! A tamper-evident ledger for loan lifecycles.
//!
//! ## Overview
//!
//! Each loan is an append-only chain of status records:
//!
//! - **Records**: Immutable. A status change is a new record linked to the
//!   previous one by a SHA-256 hash over its fields.
//! - **Metadata**: Encrypted once, at creation, under a random data key.
//! - **Key Envelope**: The data key wrapped separately for the applicant and
//!   the institution, each under a key derived from their own password.
//!
//! Either party can decrypt the metadata alone. Anyone can verify the chain.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loanchain::{Ledger, LedgerConfig, PrincipalId, PrincipalRole};
//! use loanchain::store::SqliteStore;
//!
//! async fn example() -> loanchain::Result<()> {
//!     let store = SqliteStore::open("ledger.db")?;
//!     let ledger = Ledger::new(store, LedgerConfig::from_env()?)?;
//!
//!     let alice = PrincipalId::new("alice")?;
//!     let bank = PrincipalId::new("first-bank")?;
//!     ledger.register_principal(alice.clone(), PrincipalRole::Applicant, None).await?;
//!     ledger
//!         .register_principal(bank.clone(), PrincipalRole::Institution, Some("First Bank".into()))
//!         .await?;
//!
//!     let (loan_id, _genesis) = ledger
//!         .create_chain(&alice, &bank, r#"{"amount":1000}"#, "pw1", "pw2")
//!         .await?;
//!     ledger.append_transition(&loan_id, "accepted").await?;
//!
//!     let metadata = ledger.decrypt_for(&loan_id, PrincipalRole::Applicant, "pw1").await?;
//!     let chain = ledger.get_chain(&loan_id).await?;
//!     assert!(ledger.verify_chain(&chain));
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `loanchain::core` - Records, statuses and the hash chain
//! - `loanchain::envelope` - Key derivation and envelope encryption
//! - `loanchain::store` - Storage abstraction and SQLite

pub mod config;
pub mod error;
pub mod intermediary;
pub mod ledger;
pub mod locks;

// Re-export component crates
pub use loanchain_core as core;
pub use loanchain_envelope as envelope;
pub use loanchain_store as store;

// Re-export main types for convenience
pub use config::LedgerConfig;
pub use error::{ConfigError, ErrorKind, LedgerError, Result};
pub use intermediary::IntermediarySelector;
pub use ledger::Ledger;
pub use locks::LoanLocks;

// Re-export commonly used core types
pub use loanchain_core::{
    verify_chain, ChainViolation, Clock, FixedClock, Intermediary, IntermediaryId, LinkHash,
    LoanId, LoanIdWidth, LoanRecord, LoanStatus, Principal, PrincipalId, PrincipalRole,
    SystemClock,
};
