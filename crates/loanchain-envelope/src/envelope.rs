//! The per-loan key envelope and metadata sealing.
//!
//! One data key encrypts a loan's metadata. The envelope holds two
//! independently wrapped copies of it, one per principal, so either side
//! can open the metadata with only its own password.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use loanchain_core::{LoanId, PrincipalRole, SealedMetadata};

use crate::cipher::{self, DataKey, WrappedKey};
use crate::error::{EnvelopeError, Result};
use crate::kdf::DerivedKey;

/// Wrapped copies of a loan's data key. Exactly one per loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEnvelope {
    pub loan_id: LoanId,
    pub applicant: WrappedKey,
    pub institution: WrappedKey,
}

impl KeyEnvelope {
    /// Wrap `data_key` once for each principal.
    pub fn seal(
        loan_id: LoanId,
        data_key: &DataKey,
        applicant_key: &DerivedKey,
        institution_key: &DerivedKey,
    ) -> Result<Self> {
        Ok(Self {
            loan_id,
            applicant: cipher::wrap(data_key, applicant_key)?,
            institution: cipher::wrap(data_key, institution_key)?,
        })
    }

    /// The wrapped copy belonging to `party`.
    pub fn wrapped_for(&self, party: PrincipalRole) -> &WrappedKey {
        match party {
            PrincipalRole::Applicant => &self.applicant,
            PrincipalRole::Institution => &self.institution,
        }
    }

    /// Unwrap the data key using `party`'s derived key.
    pub fn open(&self, party: PrincipalRole, principal_key: &DerivedKey) -> Result<DataKey> {
        cipher::unwrap(self.wrapped_for(party), principal_key)
    }
}

/// Encrypt metadata text into its persisted form (base64 ciphertext + nonce).
pub fn seal_metadata(plaintext: &str, data_key: &DataKey) -> Result<SealedMetadata> {
    let (ciphertext, nonce) = cipher::encrypt(plaintext.as_bytes(), data_key)?;
    Ok(SealedMetadata {
        ciphertext: STANDARD.encode(ciphertext),
        nonce,
    })
}

/// Decrypt persisted metadata back to text.
///
/// Undecodable base64 and non-UTF-8 output are reported the same way as a
/// tag mismatch.
pub fn open_metadata(sealed: &SealedMetadata, data_key: &DataKey) -> Result<String> {
    let ciphertext = STANDARD
        .decode(&sealed.ciphertext)
        .map_err(|_| EnvelopeError::AuthenticationFailed)?;
    let plaintext = cipher::decrypt(&ciphertext, &sealed.nonce, data_key)?;
    String::from_utf8(plaintext).map_err(|_| EnvelopeError::AuthenticationFailed)
}
