//! End-to-end loan lifecycle over the in-memory store.

mod common;

use common::*;
use loanchain::core::GENESIS_SEQ;
use loanchain::store::MemoryStore;
use loanchain::{
    ErrorKind, FixedClock, Intermediary, IntermediaryId, IntermediarySelector, Ledger, LedgerError,
    LinkHash, LoanId, LoanStatus, PrincipalRole,
};

#[tokio::test]
async fn test_full_lifecycle() -> anyhow::Result<()> {
    let ledger = ledger_with_parties(MemoryStore::new()).await;

    let (loan_id, genesis) = ledger
        .create_chain(&alice(), &bank(), METADATA, APPLICANT_PASSWORD, INSTITUTION_PASSWORD)
        .await?;
    assert_eq!(genesis.status, LoanStatus::Initiated);
    assert_eq!(genesis.seq, GENESIS_SEQ);
    assert_eq!(genesis.previous_hash, LinkHash::ZERO);

    let accepted = ledger.append_transition(&loan_id, "accepted").await?;
    let paid = ledger.append_transition(&loan_id, "paid").await?;

    let chain = ledger.get_chain(&loan_id).await?;
    assert_eq!(chain.len(), 3);
    assert_eq!(chain, vec![genesis.clone(), accepted.clone(), paid.clone()]);
    assert_eq!(accepted.previous_hash, genesis.hash);
    assert_eq!(paid.previous_hash, accepted.hash);
    assert!(ledger.verify_chain(&chain));
    assert!(ledger.audit_chain(&loan_id).await?);

    // Metadata is never re-encrypted after genesis.
    assert!(chain.iter().all(|r| r.metadata == genesis.metadata));
    assert!(chain.iter().all(|r| r.parties == genesis.parties));

    assert_eq!(
        ledger
            .decrypt_for(&loan_id, PrincipalRole::Applicant, APPLICANT_PASSWORD)
            .await?,
        METADATA
    );
    assert_eq!(
        ledger
            .decrypt_for(&loan_id, PrincipalRole::Institution, INSTITUTION_PASSWORD)
            .await?,
        METADATA
    );
    Ok(())
}

#[tokio::test]
async fn test_wrong_password_fails_authentication() {
    let ledger = ledger_with_parties(MemoryStore::new()).await;
    let (loan_id, _) = ledger
        .create_chain(&alice(), &bank(), METADATA, APPLICANT_PASSWORD, INSTITUTION_PASSWORD)
        .await
        .unwrap();

    for (role, password) in [
        (PrincipalRole::Applicant, "wrong"),
        (PrincipalRole::Institution, "wrong"),
        // Each party's password opens only its own wrapping.
        (PrincipalRole::Applicant, INSTITUTION_PASSWORD),
        (PrincipalRole::Institution, APPLICANT_PASSWORD),
    ] {
        let err = ledger.decrypt_for(&loan_id, role, password).await.unwrap_err();
        assert!(matches!(err, LedgerError::AuthenticationFailed));
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    }
}

#[tokio::test]
async fn test_invalid_status_leaves_chain_untouched() {
    let ledger = ledger_with_parties(MemoryStore::new()).await;
    let (loan_id, _) = ledger
        .create_chain(&alice(), &bank(), METADATA, APPLICANT_PASSWORD, INSTITUTION_PASSWORD)
        .await
        .unwrap();

    for status in ["cancelled", "", "ACCEPTED", "initiated"] {
        let err = ledger.append_transition(&loan_id, status).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "status {:?}", status);
    }
    assert_eq!(ledger.get_chain(&loan_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_status_checked_before_lookup() {
    let ledger = ledger_with_parties(MemoryStore::new()).await;
    let unknown = LoanId::parse("00000000000000000000000000000000").unwrap();

    let err = ledger.append_transition(&unknown, "cancelled").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_unknown_loan_not_found() {
    let ledger = ledger_with_parties(MemoryStore::new()).await;
    let unknown = LoanId::parse("00000000000000000000000000000000").unwrap();

    assert_eq!(
        ledger.get_chain(&unknown).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        ledger.append_transition(&unknown, "paid").await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        ledger
            .decrypt_for(&unknown, PrincipalRole::Applicant, APPLICANT_PASSWORD)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_any_transition_order_accepted() {
    let ledger = ledger_with_parties(MemoryStore::new()).await;
    let (loan_id, _) = ledger
        .create_chain(&alice(), &bank(), METADATA, APPLICANT_PASSWORD, INSTITUTION_PASSWORD)
        .await
        .unwrap();

    for status in ["closed", "paid", "paid", "unpaid", "accepted", "completed"] {
        ledger.append_transition(&loan_id, status).await.unwrap();
    }

    let chain = ledger.get_chain(&loan_id).await.unwrap();
    assert_eq!(chain.len(), 7);
    assert_eq!(
        chain.iter().map(|r| r.seq).collect::<Vec<_>>(),
        (1..=7).collect::<Vec<_>>()
    );
    assert!(ledger.verify_chain(&chain));
}

#[tokio::test]
async fn test_tampering_detected() {
    let ledger = ledger_with_parties(MemoryStore::new()).await;
    let (loan_id, _) = ledger
        .create_chain(&alice(), &bank(), METADATA, APPLICANT_PASSWORD, INSTITUTION_PASSWORD)
        .await
        .unwrap();
    ledger.append_transition(&loan_id, "accepted").await.unwrap();
    ledger.append_transition(&loan_id, "unpaid").await.unwrap();
    let chain = ledger.get_chain(&loan_id).await.unwrap();

    let mut rewritten = chain.clone();
    rewritten[2].status = LoanStatus::Paid;
    assert!(!ledger.verify_chain(&rewritten));

    let mut restamped = chain.clone();
    restamped[1].timestamp = "1999-01-01T00:00:00.000000".into();
    assert!(!ledger.verify_chain(&restamped));

    let mut reordered = chain.clone();
    reordered.swap(1, 2);
    assert!(!ledger.verify_chain(&reordered));

    let mut truncated = chain.clone();
    truncated.remove(0);
    assert!(!ledger.verify_chain(&truncated));

    assert!(!ledger.verify_chain(&[]));
    assert!(ledger.verify_chain(&chain));
}

#[tokio::test]
async fn test_chains_are_independent() {
    let ledger = ledger_with_parties(MemoryStore::new()).await;
    let (first, _) = ledger
        .create_chain(&alice(), &bank(), METADATA, APPLICANT_PASSWORD, INSTITUTION_PASSWORD)
        .await
        .unwrap();
    let (second, _) = ledger
        .create_chain(&alice(), &bank(), r#"{"amount":5}"#, "other1", "other2")
        .await
        .unwrap();
    assert_ne!(first, second);

    ledger.append_transition(&first, "accepted").await.unwrap();
    assert_eq!(ledger.get_chain(&second).await.unwrap().len(), 1);

    assert_eq!(
        ledger
            .decrypt_for(&second, PrincipalRole::Applicant, "other1")
            .await
            .unwrap(),
        r#"{"amount":5}"#
    );
    assert_eq!(ledger.list_loans(&alice()).await.unwrap().len(), 2);
    assert_eq!(ledger.list_loans(&bank()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_fixed_clock_stamps_every_record() {
    use chrono::TimeZone;

    let at = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let ledger = Ledger::new(MemoryStore::new(), test_config())
        .unwrap()
        .with_clock(FixedClock::new(at));
    register_parties(&ledger).await;

    let (loan_id, genesis) = ledger
        .create_chain(&alice(), &bank(), METADATA, APPLICANT_PASSWORD, INSTITUTION_PASSWORD)
        .await
        .unwrap();
    let next = ledger.append_transition(&loan_id, "accepted").await.unwrap();

    assert_eq!(genesis.timestamp, "2024-01-02T03:04:05.000000");
    assert_eq!(next.timestamp, genesis.timestamp);
    // Same instant, different status: the hashes still differ.
    assert_ne!(next.hash, genesis.hash);
}

#[tokio::test]
async fn test_seeded_intermediary_selection() {
    let ledger = Ledger::new(MemoryStore::new(), test_config())
        .unwrap()
        .with_selector(IntermediarySelector::seeded(7));
    register_parties(&ledger).await;

    let pool: Vec<IntermediaryId> = ["broker-a", "broker-b", "broker-c"]
        .into_iter()
        .map(|id| IntermediaryId::new(id).unwrap())
        .collect();
    for id in &pool {
        ledger
            .register_intermediary(Intermediary {
                id: id.clone(),
                name: format!("Broker {}", id),
            })
            .await
            .unwrap();
    }

    let (loan_id, genesis) = ledger
        .create_chain(&alice(), &bank(), METADATA, APPLICANT_PASSWORD, INSTITUTION_PASSWORD)
        .await
        .unwrap();
    let chosen = genesis.intermediary_id.clone().expect("pool is not empty");
    assert!(pool.contains(&chosen));

    // Carried forward unchanged.
    let next = ledger.append_transition(&loan_id, "accepted").await.unwrap();
    assert_eq!(next.intermediary_id, Some(chosen));
}

#[tokio::test]
async fn test_blank_intermediary_name_rejected() {
    let ledger = ledger_with_parties(MemoryStore::new()).await;
    let err = ledger
        .register_intermediary(Intermediary {
            id: IntermediaryId::new("broker").unwrap(),
            name: "  ".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_duplicate_principal_conflicts() {
    let ledger = ledger_with_parties(MemoryStore::new()).await;
    let err = ledger
        .register_principal(alice(), PrincipalRole::Applicant, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_public_listing_keeps_metadata_sealed() {
    let ledger = ledger_with_parties(MemoryStore::new()).await;
    let (loan_id, genesis) = ledger
        .create_chain(&alice(), &bank(), METADATA, APPLICANT_PASSWORD, INSTITUTION_PASSWORD)
        .await
        .unwrap();

    let json = genesis.to_json();
    assert_eq!(json["loanId"], loan_id.as_str());
    assert_eq!(json["status"], "initiated");
    assert_eq!(json["institutionName"], "First Bank");
    assert!(!serde_json::to_string(&json).unwrap().contains("amount"));
}
