//! # Loanchain Testkit
//!
//! Testing utilities for the loan ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed link-hash inputs and outputs for cross-implementation checks
//! - **Generators**: Proptest strategies for statuses, timestamps and whole chains
//! - **Fixtures**: Principals, envelopes and ledgers ready for a test to use
//!
//! ## Golden Vectors
//!
//! ```rust
//! use loanchain_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     assert!(vector.matches(), "{}", vector.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use loanchain_testkit::generators::{chain_from_params, ChainParams};
//!
//! proptest! {
//!     #[test]
//!     fn chains_verify(params: ChainParams) {
//!         let chain = chain_from_params(&params);
//!         prop_assert!(loanchain_core::verify_chain(&chain, &params.hash_salt));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use loanchain_core::LoanStatus;
//! use loanchain_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let chain = fixture.make_chain("{}", &[LoanStatus::Accepted]);
//! assert_eq!(chain.len(), 2);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{ledger, ledger_with_parties, multi_loan_fixtures, TestFixture};
pub use generators::{chain_from_params, ChainParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
