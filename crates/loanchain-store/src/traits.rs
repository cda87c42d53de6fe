//! Store trait: the abstract interface for ledger persistence.
//!
//! This trait allows the ledger to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use loanchain_core::{Intermediary, LoanId, LoanRecord, Principal, PrincipalId};
use loanchain_envelope::KeyEnvelope;

use crate::error::Result;

/// The LedgerStore trait: async interface for ledger persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Atomic genesis**: [`create_chain`](LedgerStore::create_chain) writes the
///   key envelope and the genesis record together or not at all.
/// - **Linear chains**: [`append_record`](LedgerStore::append_record) accepts a
///   record only at the position directly after the current latest record.
///   A racing writer that lost gets [`StoreError::Conflict`](crate::StoreError::Conflict).
/// - **Append-only**: records are never updated or deleted.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Principal Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a new principal. Fails with `AlreadyExists` on a duplicate id.
    async fn insert_principal(&self, principal: &Principal) -> Result<()>;

    /// Get a principal by id.
    async fn get_principal(&self, id: &PrincipalId) -> Result<Option<Principal>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Intermediary Directory
    // ─────────────────────────────────────────────────────────────────────────

    /// Add an intermediary. Fails with `AlreadyExists` on a duplicate id.
    async fn insert_intermediary(&self, intermediary: &Intermediary) -> Result<()>;

    /// List every intermediary, ordered by id.
    async fn list_intermediaries(&self) -> Result<Vec<Intermediary>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Chain Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist a new chain: its key envelope and genesis record, atomically.
    ///
    /// Fails with `AlreadyExists` if the loan id is taken and with
    /// `InvalidData` if the record is not a genesis record for the
    /// envelope's loan.
    async fn create_chain(&self, envelope: &KeyEnvelope, genesis: &LoanRecord) -> Result<()>;

    /// Append a record to an existing chain.
    ///
    /// # Returns
    /// - `NotFound` if the loan has no records.
    /// - `Conflict` if `record.seq` is not the latest seq plus one.
    async fn append_record(&self, record: &LoanRecord) -> Result<()>;

    /// The record with the highest seq for a loan.
    async fn latest_record(&self, loan_id: &LoanId) -> Result<Option<LoanRecord>>;

    /// Every record of a loan, ordered by seq. Empty if the loan is unknown.
    async fn get_chain(&self, loan_id: &LoanId) -> Result<Vec<LoanRecord>>;

    /// The key envelope of a loan.
    async fn get_envelope(&self, loan_id: &LoanId) -> Result<Option<KeyEnvelope>>;

    /// Loans where the principal is applicant or institution, oldest first.
    async fn list_loans(&self, principal: &PrincipalId) -> Result<Vec<LoanId>>;
}

pub(crate) fn check_genesis(envelope: &KeyEnvelope, genesis: &LoanRecord) -> Result<()> {
    use crate::error::StoreError;

    if envelope.loan_id != genesis.loan_id {
        return Err(StoreError::InvalidData(format!(
            "envelope for {} paired with record for {}",
            envelope.loan_id, genesis.loan_id
        )));
    }
    if !genesis.is_genesis() {
        return Err(StoreError::InvalidData(format!(
            "record seq {} is not a genesis record",
            genesis.seq
        )));
    }
    Ok(())
}
