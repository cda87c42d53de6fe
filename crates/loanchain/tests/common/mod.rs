//! Shared setup for the integration tests.

#![allow(dead_code)]

use loanchain::store::LedgerStore;
use loanchain::{Ledger, LedgerConfig, PrincipalId, PrincipalRole};

pub const APPLICANT_PASSWORD: &str = "pw1";
pub const INSTITUTION_PASSWORD: &str = "pw2";
pub const METADATA: &str = r#"{"amount":1000}"#;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Low iteration count; derivation cost is not under test here.
pub fn test_config() -> LedgerConfig {
    LedgerConfig::default().with_kdf_iterations(16)
}

pub fn alice() -> PrincipalId {
    PrincipalId::new("alice").unwrap()
}

pub fn bank() -> PrincipalId {
    PrincipalId::new("first-bank").unwrap()
}

/// A ledger with one applicant and one institution registered.
pub async fn ledger_with_parties<S: LedgerStore>(store: S) -> Ledger<S> {
    init_tracing();
    let ledger = Ledger::new(store, test_config()).unwrap();
    register_parties(&ledger).await;
    ledger
}

pub async fn register_parties<S: LedgerStore>(ledger: &Ledger<S>) {
    ledger
        .register_principal(alice(), PrincipalRole::Applicant, None)
        .await
        .unwrap();
    ledger
        .register_principal(bank(), PrincipalRole::Institution, Some("First Bank".into()))
        .await
        .unwrap();
}
