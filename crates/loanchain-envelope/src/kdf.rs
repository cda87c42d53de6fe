//! Password-based key derivation.
//!
//! PBKDF2 with HMAC-SHA256. The derived key is never stored: the same
//! password and salt reproduce it whenever a wrapped key must be opened.

use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use loanchain_core::Salt;

use crate::error::{EnvelopeError, Result};

/// Iteration count used unless configured otherwise.
pub const DEFAULT_ITERATIONS: u32 = 200_000;

/// Length of every symmetric key in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// A key derived from a principal's password. Only ever used to wrap and
/// unwrap data keys.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derive a 256-bit key from a password and a principal's salt.
///
/// Deterministic: identical inputs always produce the identical key.
pub fn derive(password: &str, salt: &Salt, iterations: u32) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(EnvelopeError::EmptyPassword);
    }
    if iterations == 0 {
        return Err(EnvelopeError::ZeroIterations);
    }
    Ok(pbkdf2_sha256(password.as_bytes(), salt.as_bytes(), iterations))
}

/// Like [`derive`], for a salt read back from storage as raw bytes.
pub fn derive_from_slice(password: &str, salt: &[u8], iterations: u32) -> Result<DerivedKey> {
    let salt = Salt::try_from(salt)?;
    derive(password, &salt, iterations)
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> DerivedKey {
    let mut out = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
    let key = DerivedKey(out);
    out.zeroize();
    key
}
