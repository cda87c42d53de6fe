//! In-memory implementation of the LedgerStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use loanchain_core::{
    Intermediary, IntermediaryId, LoanId, LoanRecord, Principal, PrincipalId,
};
use loanchain_envelope::KeyEnvelope;

use crate::error::{Result, StoreError};
use crate::traits::{check_genesis, LedgerStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    principals: HashMap<PrincipalId, Principal>,

    /// Sorted by id, matching the SQLite listing order.
    intermediaries: BTreeMap<IntermediaryId, Intermediary>,

    envelopes: HashMap<LoanId, KeyEnvelope>,

    /// Records per loan, in seq order.
    chains: HashMap<LoanId, Vec<LoanRecord>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn insert_principal(&self, principal: &Principal) -> Result<()> {
        let mut inner = self.write()?;
        if inner.principals.contains_key(&principal.id) {
            return Err(StoreError::AlreadyExists(format!("principal {}", principal.id)));
        }
        inner
            .principals
            .insert(principal.id.clone(), principal.clone());
        Ok(())
    }

    async fn get_principal(&self, id: &PrincipalId) -> Result<Option<Principal>> {
        Ok(self.read()?.principals.get(id).cloned())
    }

    async fn insert_intermediary(&self, intermediary: &Intermediary) -> Result<()> {
        let mut inner = self.write()?;
        if inner.intermediaries.contains_key(&intermediary.id) {
            return Err(StoreError::AlreadyExists(format!(
                "intermediary {}",
                intermediary.id
            )));
        }
        inner
            .intermediaries
            .insert(intermediary.id.clone(), intermediary.clone());
        Ok(())
    }

    async fn list_intermediaries(&self) -> Result<Vec<Intermediary>> {
        Ok(self.read()?.intermediaries.values().cloned().collect())
    }

    async fn create_chain(&self, envelope: &KeyEnvelope, genesis: &LoanRecord) -> Result<()> {
        check_genesis(envelope, genesis)?;

        // Both maps change under one write guard.
        let mut inner = self.write()?;
        if inner.envelopes.contains_key(&envelope.loan_id)
            || inner.chains.contains_key(&envelope.loan_id)
        {
            return Err(StoreError::AlreadyExists(format!("loan {}", envelope.loan_id)));
        }
        inner
            .envelopes
            .insert(envelope.loan_id.clone(), envelope.clone());
        inner
            .chains
            .insert(genesis.loan_id.clone(), vec![genesis.clone()]);
        Ok(())
    }

    async fn append_record(&self, record: &LoanRecord) -> Result<()> {
        let mut inner = self.write()?;
        let chain = inner
            .chains
            .get_mut(&record.loan_id)
            .ok_or_else(|| StoreError::NotFound(format!("loan {}", record.loan_id)))?;

        let latest = chain.last().map(|r| r.seq).unwrap_or(0);
        if record.seq != latest + 1 {
            return Err(StoreError::Conflict {
                loan_id: record.loan_id.to_string(),
                expected: latest + 1,
                got: record.seq,
            });
        }
        chain.push(record.clone());
        Ok(())
    }

    async fn latest_record(&self, loan_id: &LoanId) -> Result<Option<LoanRecord>> {
        Ok(self
            .read()?
            .chains
            .get(loan_id)
            .and_then(|chain| chain.last().cloned()))
    }

    async fn get_chain(&self, loan_id: &LoanId) -> Result<Vec<LoanRecord>> {
        Ok(self
            .read()?
            .chains
            .get(loan_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_envelope(&self, loan_id: &LoanId) -> Result<Option<KeyEnvelope>> {
        Ok(self.read()?.envelopes.get(loan_id).cloned())
    }

    async fn list_loans(&self, principal: &PrincipalId) -> Result<Vec<LoanId>> {
        let inner = self.read()?;
        let mut loans: Vec<(&str, &LoanId)> = inner
            .chains
            .values()
            .filter_map(|chain| chain.first())
            .filter(|genesis| {
                genesis.parties.applicant_id == *principal
                    || genesis.parties.institution_id == *principal
            })
            .map(|genesis| (genesis.timestamp.as_str(), &genesis.loan_id))
            .collect();
        loans.sort();
        Ok(loans.into_iter().map(|(_, id)| id.clone()).collect())
    }
}
