//! Record and envelope builders shared by the backend tests.

use loanchain_core::{
    LoanId, LoanRecord, LoanStatus, Nonce, Parties, PrincipalId, RecordBuilder, SealedMetadata,
};
use loanchain_envelope::{KeyEnvelope, WrappedKey};

const SALT: &str = "store-tests";

pub fn genesis_record() -> LoanRecord {
    let parties = Parties {
        applicant_id: PrincipalId::new("alice").unwrap(),
        institution_id: PrincipalId::new("first-bank").unwrap(),
        institution_name: Some("First Bank".into()),
    };
    let metadata = SealedMetadata {
        ciphertext: "c2VhbGVk".into(),
        nonce: Nonce::from_bytes([5; 12]),
    };
    RecordBuilder::genesis(LoanId::parse("0011223344556677").unwrap(), metadata, parties)
        .timestamp("2025-01-01T00:00:00.000000")
        .seal(SALT)
}

pub fn next_record(prev: &LoanRecord, status: LoanStatus) -> LoanRecord {
    RecordBuilder::successor(prev, status)
        .timestamp(format!("2025-01-01T00:00:{:02}.000000", prev.seq))
        .seal(SALT)
}

pub fn envelope_for(loan_id: &LoanId) -> KeyEnvelope {
    KeyEnvelope {
        loan_id: loan_id.clone(),
        applicant: WrappedKey {
            ciphertext: vec![1; 48],
            nonce: Nonce::from_bytes([1; 12]),
        },
        institution: WrappedKey {
            ciphertext: vec![2; 48],
            nonce: Nonce::from_bytes([2; 12]),
        },
    }
}
