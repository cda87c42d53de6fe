//! The Ledger: orchestration of key derivation, envelope encryption and the
//! hash chain over a [`LedgerStore`].

use std::sync::Arc;

use tokio::sync::Semaphore;
use zeroize::Zeroizing;

use loanchain_core::{
    verify_chain_detailed, ChainViolation, Clock, Intermediary, LoanId, LoanRecord, LoanStatus,
    Parties, Principal, PrincipalId, PrincipalRole, RecordBuilder, Salt, SystemClock,
    ValidationError,
};
use loanchain_envelope::{
    derive, generate_data_key, open_metadata, seal_metadata, DerivedKey, KeyEnvelope,
};
use loanchain_store::LedgerStore;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::intermediary::IntermediarySelector;
use crate::locks::LoanLocks;

/// The main Ledger struct.
///
/// Provides a unified API for:
/// - Registering principals and intermediaries
/// - Creating loan chains (the only password-bearing write)
/// - Appending status transitions
/// - Decrypting metadata for either party
/// - Reading and verifying chains
pub struct Ledger<S: LedgerStore> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: LedgerConfig,
    /// Source of record timestamps.
    clock: Arc<dyn Clock>,
    /// Serializes appends per loan.
    locks: LoanLocks,
    /// Bounds concurrent key derivations.
    kdf_permits: Arc<Semaphore>,
    /// Picks an intermediary for each new chain.
    selector: IntermediarySelector,
}

impl<S: LedgerStore> Ledger<S> {
    /// Create a new ledger instance.
    pub fn new(store: S, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: Arc::new(store),
            kdf_permits: Arc::new(Semaphore::new(config.kdf_concurrency)),
            config,
            clock: Arc::new(SystemClock),
            locks: LoanLocks::new(),
            selector: IntermediarySelector::from_entropy(),
        })
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the intermediary selector.
    pub fn with_selector(mut self, selector: IntermediarySelector) -> Self {
        self.selector = selector;
        self
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a principal with a freshly generated salt.
    pub async fn register_principal(
        &self,
        id: PrincipalId,
        role: PrincipalRole,
        display_name: Option<String>,
    ) -> Result<Principal> {
        let principal = Principal::register(id, role, display_name);
        self.store.insert_principal(&principal).await?;
        tracing::info!(principal = %principal.id, role = role.as_str(), "registered principal");
        Ok(principal)
    }

    /// Add an intermediary to the directory new loans draw from.
    pub async fn register_intermediary(&self, intermediary: Intermediary) -> Result<()> {
        if intermediary.name.trim().is_empty() {
            return Err(ValidationError::MissingField("intermediary name").into());
        }
        self.store.insert_intermediary(&intermediary).await?;
        tracing::info!(intermediary = %intermediary.id, "registered intermediary");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chain Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new loan chain.
    ///
    /// Encrypts `metadata` under a fresh data key, wraps that key once for
    /// each principal and persists the key envelope together with the
    /// genesis record. Nothing is written unless both succeed.
    pub async fn create_chain(
        &self,
        applicant_id: &PrincipalId,
        institution_id: &PrincipalId,
        metadata: &str,
        applicant_password: &str,
        institution_password: &str,
    ) -> Result<(LoanId, LoanRecord)> {
        if metadata.is_empty() {
            return Err(ValidationError::MissingField("metadata").into());
        }
        if applicant_password.is_empty() || institution_password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }

        let applicant = self
            .principal_with_role(applicant_id, PrincipalRole::Applicant)
            .await?;
        let institution = self
            .principal_with_role(institution_id, PrincipalRole::Institution)
            .await?;

        let (applicant_key, institution_key) = tokio::try_join!(
            self.derive_key(applicant_password, applicant.salt),
            self.derive_key(institution_password, institution.salt),
        )?;

        let data_key = generate_data_key();
        let sealed = seal_metadata(metadata, &data_key)?;
        let loan_id = LoanId::generate(self.config.loan_id_width);
        let envelope =
            KeyEnvelope::seal(loan_id.clone(), &data_key, &applicant_key, &institution_key)?;

        let pool = self.store.list_intermediaries().await?;
        let intermediary = self.selector.choose(&pool).map(|i| i.id.clone());

        let parties = Parties {
            applicant_id: applicant.id,
            institution_id: institution.id,
            institution_name: institution.display_name,
        };
        let genesis = RecordBuilder::genesis(loan_id.clone(), sealed, parties)
            .intermediary(intermediary)
            .timestamp_from(self.clock.as_ref())
            .seal(&self.config.hash_salt);

        self.store.create_chain(&envelope, &genesis).await?;

        tracing::info!(
            loan_id = %loan_id,
            seq = genesis.seq,
            intermediary = ?genesis.intermediary_id,
            "created loan chain"
        );
        Ok((loan_id, genesis))
    }

    /// Append a status transition to an existing chain.
    ///
    /// `new_status` must be one of the non-genesis statuses; it is checked
    /// before anything is read or written.
    pub async fn append_transition(&self, loan_id: &LoanId, new_status: &str) -> Result<LoanRecord> {
        let status = LoanStatus::parse_transition(new_status)?;

        let _guard = self.locks.acquire(loan_id).await;

        let latest = self
            .store
            .latest_record(loan_id)
            .await?
            .ok_or_else(|| not_found(loan_id))?;

        let record = RecordBuilder::successor(&latest, status)
            .timestamp_from(self.clock.as_ref())
            .seal(&self.config.hash_salt);

        if let Err(e) = self.store.append_record(&record).await {
            let err = LedgerError::from(e);
            if err.is_retryable() {
                tracing::warn!(loan_id = %loan_id, seq = record.seq, "append lost a race");
            }
            return Err(err);
        }

        tracing::info!(loan_id = %loan_id, seq = record.seq, status = %status, "appended transition");
        Ok(record)
    }

    /// Decrypt a loan's metadata for one of its two parties.
    ///
    /// A wrong password and corrupt stored data fail identically with
    /// [`LedgerError::AuthenticationFailed`].
    pub async fn decrypt_for(
        &self,
        loan_id: &LoanId,
        party: PrincipalRole,
        password: &str,
    ) -> Result<String> {
        let envelope = self
            .store
            .get_envelope(loan_id)
            .await?
            .ok_or_else(|| not_found(loan_id))?;
        let record = self
            .store
            .latest_record(loan_id)
            .await?
            .ok_or_else(|| not_found(loan_id))?;

        let principal_id = match party {
            PrincipalRole::Applicant => &record.parties.applicant_id,
            PrincipalRole::Institution => &record.parties.institution_id,
        };
        let principal = self
            .store
            .get_principal(principal_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("principal {}", principal_id)))?;

        let key = self.derive_key(password, principal.salt).await?;

        let opened = envelope
            .open(party, &key)
            .and_then(|data_key| open_metadata(&record.metadata, &data_key));

        match opened {
            Ok(plaintext) => {
                tracing::debug!(loan_id = %loan_id, party = party.as_str(), "decrypted metadata");
                Ok(plaintext)
            }
            Err(e) => {
                let err = LedgerError::from(e);
                if matches!(err, LedgerError::AuthenticationFailed) {
                    tracing::warn!(loan_id = %loan_id, party = party.as_str(), "metadata decryption refused");
                }
                Err(err)
            }
        }
    }

    /// Every record of a loan, genesis first.
    pub async fn get_chain(&self, loan_id: &LoanId) -> Result<Vec<LoanRecord>> {
        let records = self.store.get_chain(loan_id).await?;
        if records.is_empty() {
            return Err(not_found(loan_id));
        }
        Ok(records)
    }

    /// The most recent record of a loan.
    pub async fn latest_record(&self, loan_id: &LoanId) -> Result<LoanRecord> {
        self.store
            .latest_record(loan_id)
            .await?
            .ok_or_else(|| not_found(loan_id))
    }

    /// Loans the principal is a party to, oldest first.
    pub async fn list_loans(&self, principal_id: &PrincipalId) -> Result<Vec<LoanId>> {
        Ok(self.store.list_loans(principal_id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Check an ordered list of records against this deployment's hash salt.
    pub fn verify_chain(&self, records: &[LoanRecord]) -> bool {
        self.verify_chain_detailed(records).is_ok()
    }

    /// Like [`verify_chain`](Self::verify_chain), naming the first violation.
    pub fn verify_chain_detailed(
        &self,
        records: &[LoanRecord],
    ) -> std::result::Result<(), ChainViolation> {
        verify_chain_detailed(records, &self.config.hash_salt)
    }

    /// Load a stored chain and verify it.
    pub async fn audit_chain(&self, loan_id: &LoanId) -> Result<bool> {
        let records = self.get_chain(loan_id).await?;
        match self.verify_chain_detailed(&records) {
            Ok(()) => Ok(true),
            Err(violation) => {
                tracing::warn!(loan_id = %loan_id, %violation, "chain failed verification");
                Ok(false)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    async fn principal_with_role(&self, id: &PrincipalId, role: PrincipalRole) -> Result<Principal> {
        let principal = self
            .store
            .get_principal(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("principal {}", id)))?;

        if principal.role != role {
            return Err(ValidationError::WrongRole {
                id: id.to_string(),
                expected: role.as_str(),
                actual: principal.role.as_str(),
            }
            .into());
        }
        Ok(principal)
    }

    /// Run PBKDF2 on the blocking pool, at most `kdf_concurrency` at a time.
    async fn derive_key(&self, password: &str, salt: Salt) -> Result<DerivedKey> {
        let _permit = self
            .kdf_permits
            .acquire()
            .await
            .map_err(|e| LedgerError::Internal(e.to_string()))?;

        let password = Zeroizing::new(password.to_owned());
        let iterations = self.config.kdf_iterations;

        let key = tokio::task::spawn_blocking(move || derive(&password, &salt, iterations))
            .await
            .map_err(|e| LedgerError::Internal(format!("key derivation task failed: {}", e)))??;
        Ok(key)
    }
}

fn not_found(loan_id: &LoanId) -> LedgerError {
    LedgerError::NotFound(format!("loan {}", loan_id))
}
