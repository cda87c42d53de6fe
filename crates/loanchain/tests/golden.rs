//! Golden link hashes for cross-implementation verification.
//!
//! Any implementation of the ledger must reproduce these hashes from the same
//! inputs, byte for byte. The preimage is
//! `ciphertext|status|previous_hash|loan_id|nonce_hex|timestamp|domain_salt`.

use loanchain::core::{compute_hash, Nonce, Parties, RecordBuilder, SealedMetadata};
use loanchain::{verify_chain, LinkHash, LoanId, LoanRecord, LoanStatus, PrincipalId};

const CIPHERTEXT: &str = "Y2lwaGVydGV4dA==";
const LOAN_ID: &str = "0011223344556677";
const NONCE_HEX: &str = "000102030405060708090a0b";
const SALT: &str = "app-wide-hash-salt";

const GENESIS_HASH: &str = "64cfe853cfaf96470ad83e4dc6f008d032dc3761d9f909a4424493ad044034c7";
const ACCEPTED_HASH: &str = "2fff3a58168517f809f2d3fa2bc59b240131342b66cd8e6c2cd84e97205b0645";
const PAID_HASH: &str = "de19e212048887ccc1cff76c22fc26c36ffcae7e7ee0076a2751a61a319142d3";

fn zero_hex() -> String {
    LinkHash::ZERO.to_hex()
}

fn golden_chain() -> Vec<LoanRecord> {
    let metadata = SealedMetadata {
        ciphertext: CIPHERTEXT.into(),
        nonce: Nonce::from_bytes([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
    };
    let parties = Parties {
        applicant_id: PrincipalId::new("alice").unwrap(),
        institution_id: PrincipalId::new("first-bank").unwrap(),
        institution_name: Some("First Bank".into()),
    };

    let genesis = RecordBuilder::genesis(LoanId::parse(LOAN_ID).unwrap(), metadata, parties)
        .timestamp("2024-01-02T03:04:05.000000")
        .seal(SALT);
    let accepted = RecordBuilder::successor(&genesis, LoanStatus::Accepted)
        .timestamp("2024-01-02T03:05:00.000000")
        .seal(SALT);
    let paid = RecordBuilder::successor(&accepted, LoanStatus::Paid)
        .timestamp("2024-02-01T00:00:00.000000")
        .seal(SALT);
    vec![genesis, accepted, paid]
}

#[test]
fn test_genesis_vector() {
    let hash = compute_hash(
        CIPHERTEXT,
        "initiated",
        &zero_hex(),
        LOAN_ID,
        NONCE_HEX,
        "2024-01-02T03:04:05.000000",
        SALT,
    );
    assert_eq!(hash.to_hex(), GENESIS_HASH);
}

#[test]
fn test_successor_vectors() {
    let accepted = compute_hash(
        CIPHERTEXT,
        "accepted",
        GENESIS_HASH,
        LOAN_ID,
        NONCE_HEX,
        "2024-01-02T03:05:00.000000",
        SALT,
    );
    assert_eq!(accepted.to_hex(), ACCEPTED_HASH);

    let paid = compute_hash(
        CIPHERTEXT,
        "paid",
        ACCEPTED_HASH,
        LOAN_ID,
        NONCE_HEX,
        "2024-02-01T00:00:00.000000",
        SALT,
    );
    assert_eq!(paid.to_hex(), PAID_HASH);
}

#[test]
fn test_builder_matches_vectors() {
    let chain = golden_chain();
    let hashes: Vec<String> = chain.iter().map(|r| r.hash.to_hex()).collect();
    assert_eq!(hashes, vec![GENESIS_HASH, ACCEPTED_HASH, PAID_HASH]);
    assert_eq!(chain[0].metadata.nonce.to_hex(), NONCE_HEX);
    assert!(verify_chain(&chain, SALT));
}

#[test]
fn test_parties_outside_preimage() {
    // Party and intermediary fields travel with the record but are not hashed.
    let mut chain = golden_chain();
    chain[1].parties.institution_name = None;
    assert_eq!(chain[1].compute_hash(SALT).to_hex(), ACCEPTED_HASH);
}

#[test]
fn test_empty_fields_vector() {
    let hash = compute_hash("", "initiated", &zero_hex(), LOAN_ID, NONCE_HEX, "", "x");
    assert_eq!(
        hash.to_hex(),
        "8c07d54c467a121cb4245df7f8d37c27c3a932abb085064f6b687a65fbf08896"
    );
}

#[test]
fn test_salt_vector() {
    let hash = compute_hash(
        CIPHERTEXT,
        "initiated",
        &zero_hex(),
        LOAN_ID,
        NONCE_HEX,
        "2024-01-02T03:04:05.000000",
        "other-salt",
    );
    assert_eq!(
        hash.to_hex(),
        "ba2174c7a826978fb0b9be4b879eeff402b14ab53a06d56ef8bb30ea551619e2"
    );
    assert!(!verify_chain(&golden_chain(), "other-salt"));
}

#[test]
fn test_hash_hex_is_lowercase() {
    let chain = golden_chain();
    for record in &chain {
        let hex = record.hash.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, hex.to_lowercase());
        assert_eq!(LinkHash::from_hex(&hex).unwrap(), record.hash);
    }
}
