//! Proptest generators for property-based testing.

use proptest::prelude::*;

use loanchain_core::{
    LinkHash, LoanId, LoanRecord, LoanStatus, Nonce, Parties, PrincipalId, RecordBuilder,
    SealedMetadata,
};

/// Generate any status, `initiated` included.
pub fn status() -> impl Strategy<Value = LoanStatus> {
    proptest::sample::select(LoanStatus::ALL.to_vec())
}

/// Generate a status valid for a transition.
pub fn transition() -> impl Strategy<Value = LoanStatus> {
    proptest::sample::select(LoanStatus::TRANSITIONS.to_vec())
}

/// Generate a 64- or 128-bit loan id.
pub fn loan_id() -> impl Strategy<Value = LoanId> {
    prop_oneof!["[0-9a-f]{16}", "[0-9a-f]{32}"]
        .prop_map(|s| LoanId::parse(&s).expect("pattern yields a valid id"))
}

/// Generate a random LinkHash.
pub fn link_hash() -> impl Strategy<Value = LinkHash> {
    any::<[u8; 32]>().prop_map(LinkHash::from_bytes)
}

/// Generate a random Nonce.
pub fn nonce() -> impl Strategy<Value = Nonce> {
    any::<[u8; 12]>().prop_map(Nonce::from_bytes)
}

/// Generate a standard-base64 ciphertext of up to `max_len` encoded bytes.
pub fn ciphertext(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/".to_vec(),
        ),
        0..=max_len,
    )
    .prop_map(|bytes| String::from_utf8(bytes).expect("ascii"))
}

/// Generate a record timestamp.
pub fn timestamp() -> impl Strategy<Value = String> {
    (2000u32..=2099, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60, 0u32..1_000_000).prop_map(
        |(y, mo, d, h, mi, s, us)| format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}.{us:06}"),
    )
}

/// Generate plaintext metadata: a small JSON object.
pub fn metadata() -> impl Strategy<Value = String> {
    (0u64..1_000_000, "[a-z ]{0,24}")
        .prop_map(|(amount, note)| format!("{{\"amount\":{},\"note\":\"{}\"}}", amount, note))
}

/// Generate a principal id.
pub fn principal_id() -> impl Strategy<Value = PrincipalId> {
    "[a-z][a-z0-9-]{0,31}".prop_map(|s| PrincipalId::new(s).expect("pattern yields a valid id"))
}

/// Parameters for building a whole chain.
#[derive(Debug, Clone)]
pub struct ChainParams {
    pub loan_id: LoanId,
    pub ciphertext: String,
    pub nonce: Nonce,
    pub applicant_id: PrincipalId,
    pub institution_id: PrincipalId,
    pub transitions: Vec<(LoanStatus, String)>,
    pub genesis_timestamp: String,
    pub hash_salt: String,
}

impl Arbitrary for ChainParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            loan_id(),
            ciphertext(64),
            nonce(),
            principal_id(),
            principal_id(),
            prop::collection::vec((transition(), timestamp()), 0..8),
            timestamp(),
            "[ -~]{1,32}", // salt
        )
            .prop_map(
                |(loan_id, ciphertext, nonce, applicant_id, institution_id, transitions, ts, salt)| {
                    ChainParams {
                        loan_id,
                        ciphertext,
                        nonce,
                        applicant_id,
                        institution_id,
                        transitions,
                        genesis_timestamp: ts,
                        hash_salt: salt,
                    }
                },
            )
            .boxed()
    }
}

/// Build the chain described by `params`.
pub fn chain_from_params(params: &ChainParams) -> Vec<LoanRecord> {
    let metadata = SealedMetadata {
        ciphertext: params.ciphertext.clone(),
        nonce: params.nonce,
    };
    let parties = Parties {
        applicant_id: params.applicant_id.clone(),
        institution_id: params.institution_id.clone(),
        institution_name: None,
    };

    let mut chain = vec![RecordBuilder::genesis(params.loan_id.clone(), metadata, parties)
        .timestamp(params.genesis_timestamp.clone())
        .seal(&params.hash_salt)];
    for (status, ts) in &params.transitions {
        let next = RecordBuilder::successor(chain.last().expect("chain is never empty"), *status)
            .timestamp(ts.clone())
            .seal(&params.hash_salt);
        chain.push(next);
    }
    chain
}
