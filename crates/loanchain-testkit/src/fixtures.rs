//! Test fixtures and helpers.
//!
//! Common setup code for integration tests and benchmarks.

use loanchain::store::{LedgerStore, MemoryStore};
use loanchain::{Ledger, LedgerConfig};
use loanchain_core::{
    LoanId, LoanIdWidth, LoanRecord, LoanStatus, Parties, Principal, PrincipalId, PrincipalRole,
    RecordBuilder, Salt, SealedMetadata,
};
use loanchain_envelope::{derive, generate_data_key, seal_metadata, DataKey, KeyEnvelope};

/// Iteration count used by fixtures. Far below production; derivation cost
/// is never what a fixture is testing.
pub const FIXTURE_ITERATIONS: u32 = 16;

/// Deployment salt used by fixture chains.
pub const FIXTURE_HASH_SALT: &str = "testkit-hash-salt";

pub const APPLICANT_PASSWORD: &str = "applicant-pw";
pub const INSTITUTION_PASSWORD: &str = "institution-pw";

/// A pair of principals, one loan id and its data key.
///
/// Builds records and envelopes directly, without a ledger, for tests that
/// need exact control over what goes into a store.
pub struct TestFixture {
    pub applicant: Principal,
    pub institution: Principal,
    pub loan_id: LoanId,
    pub data_key: DataKey,
    pub hash_salt: String,
}

impl TestFixture {
    /// Create a new fixture with random salts, loan id and data key.
    pub fn new() -> Self {
        Self {
            applicant: Principal::register(
                PrincipalId::new("applicant").expect("valid id"),
                PrincipalRole::Applicant,
                None,
            ),
            institution: Principal::register(
                PrincipalId::new("institution").expect("valid id"),
                PrincipalRole::Institution,
                Some("Fixture Bank".into()),
            ),
            loan_id: LoanId::generate(LoanIdWidth::Wide128),
            data_key: generate_data_key(),
            hash_salt: FIXTURE_HASH_SALT.into(),
        }
    }

    /// Create with deterministic principal salts and data key.
    pub fn with_seed(seed: u8) -> Self {
        let mut fixture = Self::new();
        fixture.applicant.salt = Salt::from_bytes([seed; 16]);
        fixture.institution.salt = Salt::from_bytes([seed.wrapping_add(1); 16]);
        fixture.data_key = DataKey::from_bytes([seed; 32]);
        fixture
    }

    pub fn parties(&self) -> Parties {
        Parties {
            applicant_id: self.applicant.id.clone(),
            institution_id: self.institution.id.clone(),
            institution_name: self.institution.display_name.clone(),
        }
    }

    /// Encrypt `plaintext` under the fixture's data key.
    pub fn seal(&self, plaintext: &str) -> SealedMetadata {
        seal_metadata(plaintext, &self.data_key).expect("sealing never fails for valid keys")
    }

    /// Wrap the data key for both principals under the fixture passwords.
    pub fn envelope(&self) -> KeyEnvelope {
        let applicant_key = derive(APPLICANT_PASSWORD, &self.applicant.salt, FIXTURE_ITERATIONS)
            .expect("non-empty password");
        let institution_key =
            derive(INSTITUTION_PASSWORD, &self.institution.salt, FIXTURE_ITERATIONS)
                .expect("non-empty password");
        KeyEnvelope::seal(
            self.loan_id.clone(),
            &self.data_key,
            &applicant_key,
            &institution_key,
        )
        .expect("wrapping never fails for valid keys")
    }

    /// Create the genesis record.
    pub fn make_genesis(&self, plaintext: &str) -> LoanRecord {
        RecordBuilder::genesis(self.loan_id.clone(), self.seal(plaintext), self.parties())
            .timestamp(timestamp_for(1))
            .seal(&self.hash_salt)
    }

    /// Create the record that follows `prev`.
    pub fn make_successor(&self, prev: &LoanRecord, status: LoanStatus) -> LoanRecord {
        RecordBuilder::successor(prev, status)
            .timestamp(timestamp_for(prev.seq + 1))
            .seal(&self.hash_salt)
    }

    /// Create a genesis record followed by one record per status.
    pub fn make_chain(&self, plaintext: &str, statuses: &[LoanStatus]) -> Vec<LoanRecord> {
        let mut chain = vec![self.make_genesis(plaintext)];
        for &status in statuses {
            let next = self.make_successor(chain.last().expect("chain is never empty"), status);
            chain.push(next);
        }
        chain
    }

    /// Write both principals, the envelope and `chain` into `store`.
    pub async fn seed_store<S: LedgerStore>(
        &self,
        store: &S,
        chain: &[LoanRecord],
    ) -> loanchain_store::Result<()> {
        store.insert_principal(&self.applicant).await?;
        store.insert_principal(&self.institution).await?;
        if let Some((genesis, rest)) = chain.split_first() {
            store.create_chain(&self.envelope(), genesis).await?;
            for record in rest {
                store.append_record(record).await?;
            }
        }
        Ok(())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create several independent fixtures with distinct seeds.
pub fn multi_loan_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| TestFixture::with_seed(i as u8))
        .collect()
}

/// A ledger over a fresh [`MemoryStore`] with the fixture configuration.
pub fn ledger() -> Ledger<MemoryStore> {
    Ledger::new(MemoryStore::new(), ledger_config()).expect("fixture config is valid")
}

pub fn ledger_config() -> LedgerConfig {
    LedgerConfig::default()
        .with_hash_salt(FIXTURE_HASH_SALT)
        .with_kdf_iterations(FIXTURE_ITERATIONS)
}

/// A ledger with an applicant and an institution registered.
pub async fn ledger_with_parties() -> (Ledger<MemoryStore>, PrincipalId, PrincipalId) {
    let ledger = ledger();
    let applicant = PrincipalId::new("applicant").expect("valid id");
    let institution = PrincipalId::new("institution").expect("valid id");
    ledger
        .register_principal(applicant.clone(), PrincipalRole::Applicant, None)
        .await
        .expect("fresh store");
    ledger
        .register_principal(
            institution.clone(),
            PrincipalRole::Institution,
            Some("Fixture Bank".into()),
        )
        .await
        .expect("fresh store");
    (ledger, applicant, institution)
}

fn timestamp_for(seq: u64) -> String {
    format!("2025-01-01T00:00:00.{:06}", seq)
}
