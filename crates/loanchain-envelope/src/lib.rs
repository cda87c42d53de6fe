//! # Loanchain Envelope
//!
//! Envelope encryption of loan metadata.
//!
//! ## Encryption Model
//!
//! Metadata uses a two-layer key model:
//!
//! 1. **Data Key**: A random AES-256-GCM key, fresh per chain, that encrypts
//!    the metadata exactly once.
//! 2. **Wrapped Keys**: The data key is wrapped separately under a key each
//!    principal derives from their password (PBKDF2-HMAC-SHA256 over a
//!    per-principal salt).
//!
//! Either principal can open the metadata alone. Neither learns the other's
//! password, and the data key is never stored unwrapped.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loanchain_envelope::{derive, seal_metadata, DataKey, KeyEnvelope, DEFAULT_ITERATIONS};
//! use loanchain_core::{LoanId, LoanIdWidth, PrincipalRole, Salt};
//!
//! let applicant = derive("pw1", &Salt::generate(), DEFAULT_ITERATIONS).unwrap();
//! let institution = derive("pw2", &Salt::generate(), DEFAULT_ITERATIONS).unwrap();
//!
//! let data_key = DataKey::generate();
//! let sealed = seal_metadata(r#"{"amount":1000}"#, &data_key).unwrap();
//! let envelope = KeyEnvelope::seal(
//!     LoanId::generate(LoanIdWidth::Wide128),
//!     &data_key,
//!     &applicant,
//!     &institution,
//! )
//! .unwrap();
//!
//! let recovered = envelope.open(PrincipalRole::Applicant, &applicant).unwrap();
//! ```

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod kdf;

pub use cipher::{decrypt, encrypt, unwrap, wrap, DataKey, WrappedKey, TAG_LEN};
pub use envelope::{open_metadata, seal_metadata, KeyEnvelope};
pub use error::{EnvelopeError, Result};
pub use kdf::{derive, derive_from_slice, DerivedKey, DEFAULT_ITERATIONS, KEY_LEN};

/// Generate a fresh data key for a new chain.
pub fn generate_data_key() -> DataKey {
    DataKey::generate()
}
