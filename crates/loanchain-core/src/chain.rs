//! Hash chaining: the link hash and whole-chain verification.
//!
//! The link hash is SHA-256 over the UTF-8 bytes of seven fields joined by
//! `|`, in this exact order:
//!
//! ```text
//! ciphertext | status | previous_hash | loan_id | nonce_hex | timestamp | domain_salt
//! ```
//!
//! The order and delimiter are a wire contract. Chains written by another
//! implementation verify here only if it concatenates byte-for-byte the same.

use sha2::{Digest, Sha256};

use crate::error::ChainViolation;
use crate::record::{LoanRecord, GENESIS_SEQ};
use crate::types::LinkHash;

/// Field delimiter in the hash preimage.
pub const DELIMITER: &str = "|";

/// Compute the link hash for a record's fields.
pub fn compute_hash(
    ciphertext: &str,
    status: &str,
    previous_hash: &str,
    loan_id: &str,
    nonce_hex: &str,
    timestamp: &str,
    domain_salt: &str,
) -> LinkHash {
    let fields = [
        ciphertext,
        status,
        previous_hash,
        loan_id,
        nonce_hex,
        timestamp,
        domain_salt,
    ];

    let mut hasher = Sha256::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            hasher.update(DELIMITER.as_bytes());
        }
        hasher.update(field.as_bytes());
    }
    LinkHash(hasher.finalize().into())
}

/// Check an ordered chain: every hash recomputes and every link holds.
pub fn verify_chain(records: &[LoanRecord], domain_salt: &str) -> bool {
    verify_chain_detailed(records, domain_salt).is_ok()
}

/// Like [`verify_chain`], reporting the first violation found.
pub fn verify_chain_detailed(
    records: &[LoanRecord],
    domain_salt: &str,
) -> Result<(), ChainViolation> {
    let genesis = records.first().ok_or(ChainViolation::Empty)?;

    if !genesis.previous_hash.is_zero() {
        return Err(ChainViolation::GenesisNotAnchored);
    }
    if !genesis.status.is_genesis() {
        return Err(ChainViolation::GenesisStatus(genesis.status.to_string()));
    }

    for (index, record) in records.iter().enumerate() {
        let expected_seq = GENESIS_SEQ + index as u64;
        if record.seq != expected_seq {
            return Err(ChainViolation::InvalidSequence {
                index,
                expected: expected_seq,
                got: record.seq,
            });
        }

        if record.loan_id != genesis.loan_id {
            return Err(ChainViolation::MixedLoans { index });
        }

        let computed = record.compute_hash(domain_salt);
        if computed != record.hash {
            return Err(ChainViolation::HashMismatch {
                index,
                stored: record.hash.to_hex(),
                computed: computed.to_hex(),
            });
        }

        if index == 0 {
            continue;
        }

        if record.status.is_genesis() {
            return Err(ChainViolation::Reinitiated { index });
        }
        if record.previous_hash != records[index - 1].hash {
            return Err(ChainViolation::BrokenLink { index });
        }
        if record.metadata != genesis.metadata {
            return Err(ChainViolation::MetadataDrift { index });
        }
    }

    Ok(())
}
