//! AES-256-GCM encryption and data key wrapping.
//!
//! Every call to [`encrypt`] or [`wrap`] draws a fresh random nonce. The
//! authentication tag travels appended to the ciphertext.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use loanchain_core::Nonce;

use crate::error::{EnvelopeError, Result};
use crate::kdf::{DerivedKey, KEY_LEN};

/// Length of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// The per-chain symmetric key that encrypts a loan's metadata.
///
/// Never persisted unwrapped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_LEN]);

impl DataKey {
    /// Generate a fresh key from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataKey(..)")
    }
}

/// A data key encrypted under one principal's derived key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedKey {
    /// Encrypted data key plus tag.
    pub ciphertext: Vec<u8>,
    pub nonce: Nonce,
}

/// Encrypt `plaintext` under `key` with a fresh nonce.
pub fn encrypt(plaintext: &[u8], key: &DataKey) -> Result<(Vec<u8>, Nonce)> {
    let nonce = Nonce::generate();
    let ciphertext = seal(key.as_bytes(), &nonce, plaintext)?;
    Ok((ciphertext, nonce))
}

/// Decrypt and authenticate. Any tag mismatch is
/// [`EnvelopeError::AuthenticationFailed`]; no partial output is returned.
pub fn decrypt(ciphertext: &[u8], nonce: &Nonce, key: &DataKey) -> Result<Vec<u8>> {
    open(key.as_bytes(), nonce, ciphertext)
}

/// Encrypt a data key under a principal's derived key.
pub fn wrap(data_key: &DataKey, principal_key: &DerivedKey) -> Result<WrappedKey> {
    let nonce = Nonce::generate();
    let ciphertext = seal(principal_key.as_bytes(), &nonce, data_key.as_bytes())?;
    Ok(WrappedKey { ciphertext, nonce })
}

/// Recover a data key with a principal's derived key.
pub fn unwrap(wrapped: &WrappedKey, principal_key: &DerivedKey) -> Result<DataKey> {
    let mut raw = open(principal_key.as_bytes(), &wrapped.nonce, &wrapped.ciphertext)?;
    let key = <[u8; KEY_LEN]>::try_from(raw.as_slice())
        .map(DataKey)
        .map_err(|_| EnvelopeError::AuthenticationFailed);
    raw.zeroize();
    key
}

fn seal(key: &[u8; KEY_LEN], nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| EnvelopeError::EncryptionError(e.to_string()))?;
    cipher
        .encrypt(aes_gcm::Nonce::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|e| EnvelopeError::EncryptionError(e.to_string()))
}

fn open(key: &[u8; KEY_LEN], nonce: &Nonce, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|_| EnvelopeError::AuthenticationFailed)?;
    cipher
        .decrypt(aes_gcm::Nonce::from_slice(nonce.as_bytes()), ciphertext)
        .map_err(|_| EnvelopeError::AuthenticationFailed)
}
