//! Strong type definitions for the ledger.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Length of a link hash in bytes (SHA-256).
pub const HASH_LEN: usize = 32;

/// Length of a principal salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of an AEAD nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// A 32-byte link hash, computed as SHA-256 over the record's chained fields.
///
/// Rendered everywhere (storage, hash input, export) as 64 lowercase hex chars.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkHash(pub [u8; HASH_LEN]);

impl LinkHash {
    /// The all-zero sentinel used as the genesis record's previous hash.
    pub const ZERO: Self = Self([0u8; HASH_LEN]);

    /// Create a new LinkHash from raw bytes.
    pub const fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let mut arr = [0u8; HASH_LEN];
        hex::decode_to_slice(s, &mut arr)
            .map_err(|e| ValidationError::MalformedHash(format!("{}: {}", s, e)))?;
        Ok(Self(arr))
    }

    /// Whether this is the genesis sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Debug for LinkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for LinkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for LinkHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LEN]> for LinkHash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

/// How many random bytes back a freshly generated loan identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoanIdWidth {
    /// 64 bits (16 hex chars). Matches identifiers issued by older deployments.
    Legacy64,
    /// 128 bits (32 hex chars).
    #[default]
    Wide128,
}

impl LoanIdWidth {
    /// Number of random bytes drawn for this width.
    pub const fn byte_len(self) -> usize {
        match self {
            LoanIdWidth::Legacy64 => 8,
            LoanIdWidth::Wide128 => 16,
        }
    }
}

/// An opaque loan identifier: lowercase hex of random bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct LoanId(String);

impl LoanId {
    /// Shortest accepted identifier (64-bit legacy ids).
    pub const MIN_LEN: usize = 16;
    /// Longest accepted identifier.
    pub const MAX_LEN: usize = 64;

    /// Generate a fresh identifier from the OS random source.
    pub fn generate(width: LoanIdWidth) -> Self {
        let mut bytes = vec![0u8; width.byte_len()];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Parse and validate an identifier supplied by a caller.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let len = s.len();
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&len) {
            return Err(ValidationError::MalformedLoanId(format!(
                "length {} outside {}..={}",
                len,
                Self::MIN_LEN,
                Self::MAX_LEN
            )));
        }
        if len % 2 != 0 {
            return Err(ValidationError::MalformedLoanId(format!(
                "odd length {}",
                len
            )));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(ValidationError::MalformedLoanId(
                "expected lowercase hex".into(),
            ));
        }
        Ok(Self(s.to_owned()))
    }

    /// Borrow as str.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoanId({})", self.0)
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LoanId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LoanId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<LoanId> for String {
    fn from(id: LoanId) -> Self {
        id.0
    }
}

/// Stable identifier of a principal (applicant or institution).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Create a principal id. Must be non-empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::MissingField("principal id"));
        }
        Ok(Self(id))
    }

    /// Borrow as str.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an intermediary (agent) attached to a loan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntermediaryId(String);

impl IntermediaryId {
    /// Create an intermediary id. Must be non-empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::MissingField("intermediary id"));
        }
        Ok(Self(id))
    }

    /// Borrow as str.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntermediaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 16-byte per-principal salt, generated once at registration.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt(pub [u8; SALT_LEN]);

impl Salt {
    /// Generate a new salt from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Salt {
    type Error = ValidationError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; SALT_LEN] = slice
            .try_into()
            .map_err(|_| ValidationError::InvalidSaltLength(slice.len()))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", hex::encode(self.0))
    }
}

/// A 96-bit AEAD nonce.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce(pub [u8; NONCE_LEN]);

impl Nonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }

    /// Convert to hex string (the form mixed into link hashes).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl TryFrom<&[u8]> for Nonce {
    type Error = ValidationError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; NONCE_LEN] = slice
            .try_into()
            .map_err(|_| ValidationError::InvalidNonceLength(slice.len()))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.to_hex())
    }
}
