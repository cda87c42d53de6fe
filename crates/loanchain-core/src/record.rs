//! Records: one immutable entry per status transition.
//!
//! A record is never edited. A status change is a new record whose
//! `previous_hash` is the hash of the record before it.

use serde::{Deserialize, Serialize};

use crate::chain::compute_hash;
use crate::clock::{Clock, SystemClock};
use crate::types::{IntermediaryId, LinkHash, LoanId, Nonce, PrincipalId, Salt};
use crate::status::LoanStatus;

/// Sequence number of the genesis record.
pub const GENESIS_SEQ: u64 = 1;

/// Which side of a loan a principal sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalRole {
    Applicant,
    Institution,
}

impl PrincipalRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            PrincipalRole::Applicant => "applicant",
            PrincipalRole::Institution => "institution",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "applicant" => Some(PrincipalRole::Applicant),
            "institution" => Some(PrincipalRole::Institution),
            _ => None,
        }
    }
}

/// An identity able to derive its own unwrap key from a password and salt.
///
/// The password verifier lives with the authentication collaborator; only
/// the salt matters to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: PrincipalRole,
    /// Public display name (an institution's name is shown on every record).
    pub display_name: Option<String>,
    pub salt: Salt,
}

impl Principal {
    /// Create a principal with a freshly generated salt.
    pub fn register(id: PrincipalId, role: PrincipalRole, display_name: Option<String>) -> Self {
        Self {
            id,
            role,
            display_name,
            salt: Salt::generate(),
        }
    }
}

/// An agent that may be attached to a loan at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intermediary {
    pub id: IntermediaryId,
    pub name: String,
}

/// Encrypted metadata exactly as persisted and hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedMetadata {
    /// Standard base64 of the AEAD ciphertext (tag included).
    pub ciphertext: String,
    pub nonce: Nonce,
}

/// The two principals a chain is bound to, carried on every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parties {
    pub applicant_id: PrincipalId,
    pub institution_id: PrincipalId,
    pub institution_name: Option<String>,
}

/// A single entry in a loan chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: LoanId,
    /// Creation order marker (1-indexed, strictly increasing per loan).
    pub seq: u64,
    pub status: LoanStatus,
    pub metadata: SealedMetadata,
    pub previous_hash: LinkHash,
    pub hash: LinkHash,
    /// Captured once at construction; a hash input.
    pub timestamp: String,
    pub parties: Parties,
    pub intermediary_id: Option<IntermediaryId>,
}

impl LoanRecord {
    /// Check if this is the first record of its chain.
    pub fn is_genesis(&self) -> bool {
        self.seq == GENESIS_SEQ && self.previous_hash.is_zero()
    }

    /// Recompute the link hash from the stored fields.
    pub fn compute_hash(&self, domain_salt: &str) -> LinkHash {
        compute_hash(
            &self.metadata.ciphertext,
            self.status.as_str(),
            &self.previous_hash.to_hex(),
            self.loan_id.as_str(),
            &self.metadata.nonce.to_hex(),
            &self.timestamp,
            domain_salt,
        )
    }

    /// Check that the stored hash matches the stored fields.
    pub fn hash_matches(&self, domain_salt: &str) -> bool {
        self.compute_hash(domain_salt) == self.hash
    }

    /// Public listing form: camelCase JSON, metadata still encrypted.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "loanId": self.loan_id.as_str(),
            "seq": self.seq,
            "status": self.status.as_str(),
            "previousHash": self.previous_hash.to_hex(),
            "currentHash": self.hash.to_hex(),
            "institutionName": self.parties.institution_name,
            "intermediaryId": self.intermediary_id.as_ref().map(|id| id.as_str()),
            "metadata": {
                "ciphertext": self.metadata.ciphertext,
                "nonceHex": self.metadata.nonce.to_hex(),
            },
            "timestamp": self.timestamp,
        })
    }
}

/// Builder for creating records.
pub struct RecordBuilder {
    loan_id: LoanId,
    seq: u64,
    status: LoanStatus,
    metadata: SealedMetadata,
    previous_hash: LinkHash,
    timestamp: Option<String>,
    parties: Parties,
    intermediary_id: Option<IntermediaryId>,
}

impl RecordBuilder {
    /// Start the first record of a new chain.
    pub fn genesis(loan_id: LoanId, metadata: SealedMetadata, parties: Parties) -> Self {
        Self {
            loan_id,
            seq: GENESIS_SEQ,
            status: LoanStatus::Initiated,
            metadata,
            previous_hash: LinkHash::ZERO,
            timestamp: None,
            parties,
            intermediary_id: None,
        }
    }

    /// Start the record that follows `prev`, carrying its metadata forward.
    pub fn successor(prev: &LoanRecord, status: LoanStatus) -> Self {
        Self {
            loan_id: prev.loan_id.clone(),
            seq: prev.seq + 1,
            status,
            metadata: prev.metadata.clone(),
            previous_hash: prev.hash,
            timestamp: None,
            parties: prev.parties.clone(),
            intermediary_id: prev.intermediary_id.clone(),
        }
    }

    /// Set the intermediary reference.
    pub fn intermediary(mut self, id: Option<IntermediaryId>) -> Self {
        self.intermediary_id = id;
        self
    }

    /// Set the timestamp explicitly.
    pub fn timestamp(mut self, ts: impl Into<String>) -> Self {
        self.timestamp = Some(ts.into());
        self
    }

    /// Take the timestamp from a clock.
    pub fn timestamp_from(self, clock: &dyn Clock) -> Self {
        let ts = clock.timestamp();
        self.timestamp(ts)
    }

    /// Compute the link hash and produce the record.
    pub fn seal(self, domain_salt: &str) -> LoanRecord {
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| SystemClock.timestamp());

        let mut record = LoanRecord {
            loan_id: self.loan_id,
            seq: self.seq,
            status: self.status,
            metadata: self.metadata,
            previous_hash: self.previous_hash,
            hash: LinkHash::ZERO,
            timestamp,
            parties: self.parties,
            intermediary_id: self.intermediary_id,
        };
        record.hash = record.compute_hash(domain_salt);
        record
    }
}
