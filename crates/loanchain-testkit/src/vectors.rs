//! Golden link-hash vectors for cross-implementation verification.
//!
//! Each vector pins the seven preimage fields and the SHA-256 they must
//! produce. Another implementation agrees with this one exactly when it
//! reproduces every `expected_hash`.

use serde::{Deserialize, Serialize};

use loanchain_core::{compute_hash, LinkHash};

/// A single golden vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenVector {
    pub name: String,
    pub description: String,

    // Preimage fields, in hashing order
    pub ciphertext: String,
    pub status: String,
    pub previous_hash: String,
    pub loan_id: String,
    pub nonce_hex: String,
    pub timestamp: String,
    pub domain_salt: String,

    /// Lowercase hex SHA-256.
    pub expected_hash: String,
}

impl GoldenVector {
    /// Hash this vector's fields.
    pub fn compute(&self) -> LinkHash {
        compute_hash(
            &self.ciphertext,
            &self.status,
            &self.previous_hash,
            &self.loan_id,
            &self.nonce_hex,
            &self.timestamp,
            &self.domain_salt,
        )
    }

    pub fn matches(&self) -> bool {
        self.compute().to_hex() == self.expected_hash
    }
}

const ZERO: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[allow(clippy::too_many_arguments)]
fn vector(
    name: &str,
    description: &str,
    ciphertext: &str,
    status: &str,
    previous_hash: &str,
    loan_id: &str,
    nonce_hex: &str,
    timestamp: &str,
    domain_salt: &str,
    expected_hash: &str,
) -> GoldenVector {
    GoldenVector {
        name: name.into(),
        description: description.into(),
        ciphertext: ciphertext.into(),
        status: status.into(),
        previous_hash: previous_hash.into(),
        loan_id: loan_id.into(),
        nonce_hex: nonce_hex.into(),
        timestamp: timestamp.into(),
        domain_salt: domain_salt.into(),
        expected_hash: expected_hash.into(),
    }
}

/// All golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        vector(
            "genesis_legacy_id",
            "Genesis record with a 64-bit loan id and the default salt",
            "Y2lwaGVydGV4dA==",
            "initiated",
            ZERO,
            "0011223344556677",
            "000102030405060708090a0b",
            "2024-01-02T03:04:05.000000",
            "app-wide-hash-salt",
            "64cfe853cfaf96470ad83e4dc6f008d032dc3761d9f909a4424493ad044034c7",
        ),
        vector(
            "accepted_after_genesis",
            "First transition, linked to genesis_legacy_id",
            "Y2lwaGVydGV4dA==",
            "accepted",
            "64cfe853cfaf96470ad83e4dc6f008d032dc3761d9f909a4424493ad044034c7",
            "0011223344556677",
            "000102030405060708090a0b",
            "2024-01-02T03:05:00.000000",
            "app-wide-hash-salt",
            "2fff3a58168517f809f2d3fa2bc59b240131342b66cd8e6c2cd84e97205b0645",
        ),
        vector(
            "paid_after_accepted",
            "Second transition, linked to accepted_after_genesis",
            "Y2lwaGVydGV4dA==",
            "paid",
            "2fff3a58168517f809f2d3fa2bc59b240131342b66cd8e6c2cd84e97205b0645",
            "0011223344556677",
            "000102030405060708090a0b",
            "2024-02-01T00:00:00.000000",
            "app-wide-hash-salt",
            "de19e212048887ccc1cff76c22fc26c36ffcae7e7ee0076a2751a61a319142d3",
        ),
        vector(
            "other_salt",
            "Same fields as genesis_legacy_id under a different deployment salt",
            "Y2lwaGVydGV4dA==",
            "initiated",
            ZERO,
            "0011223344556677",
            "000102030405060708090a0b",
            "2024-01-02T03:04:05.000000",
            "other-salt",
            "ba2174c7a826978fb0b9be4b879eeff402b14ab53a06d56ef8bb30ea551619e2",
        ),
        vector(
            "empty_fields",
            "Empty ciphertext and timestamp still contribute their delimiters",
            "",
            "initiated",
            ZERO,
            "0011223344556677",
            "000102030405060708090a0b",
            "",
            "x",
            "8c07d54c467a121cb4245df7f8d37c27c3a932abb085064f6b687a65fbf08896",
        ),
        vector(
            "genesis_wide_id",
            "Genesis record with a 128-bit loan id",
            "AAAA",
            "initiated",
            ZERO,
            "00112233445566778899aabbccddeeff",
            "ffeeddccbbaa998877665544",
            "2025-06-30T23:59:59.999999",
            "app-wide-hash-salt",
            "4c9b47c9a2cc312a7ffaa06f4166da9eb46452f0ce1d2a46166118dceec538e5",
        ),
        vector(
            "closed_wide_id",
            "Terminal status on a 128-bit loan id",
            "AAAA",
            "closed",
            "64cfe853cfaf96470ad83e4dc6f008d032dc3761d9f909a4424493ad044034c7",
            "00112233445566778899aabbccddeeff",
            "ffeeddccbbaa998877665544",
            "2025-07-01T00:00:00.000000",
            "app-wide-hash-salt",
            "16b381b4f70e0954d11711e523e8267cf9cf857bec45867071767ae5f87d7c2f",
        ),
        vector(
            "salt_with_delimiter",
            "A salt containing the delimiter and non-ASCII text is hashed as UTF-8",
            "AAAA",
            "unpaid",
            ZERO,
            "00112233445566778899aabbccddeeff",
            "ffeeddccbbaa998877665544",
            "2025-07-01T00:00:00.000000",
            "sel|de-mer \u{2713}",
            "7a67075e0aac5a7ec3297a46a10f4450a3089af1e353e32a915168c348d38d4e",
        ),
    ]
}

/// Check every vector, returning the names of those that fail.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let failed: Vec<String> = all_vectors()
        .into_iter()
        .filter(|v| !v.matches())
        .map(|v| v.name)
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(failed)
    }
}
