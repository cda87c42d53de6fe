//! # Loanchain Store
//!
//! Storage abstraction for the loan ledger. Provides a trait-based interface
//! for chain persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts persistence behind the [`LedgerStore`] trait,
//! allowing the ledger to be storage-agnostic. The primary implementation
//! is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loanchain_store::{LedgerStore, SqliteStore};
//! use loanchain_core::LoanId;
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let loan_id = LoanId::parse("0011223344556677").unwrap();
//!     let chain = store.get_chain(&loan_id).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic genesis**: envelope and genesis record commit together
//! - **Stale appends**: a record not at latest seq + 1 returns `Conflict`
//! - **Uniqueness**: `(loan_id, seq)` is unique in every backend

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::LedgerStore;
