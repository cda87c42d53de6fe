//! SQLite implementation of the LedgerStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};

use loanchain_core::{
    Intermediary, IntermediaryId, LinkHash, LoanId, LoanRecord, LoanStatus, Nonce, Parties,
    Principal, PrincipalId, PrincipalRole, Salt, SealedMetadata,
};
use loanchain_envelope::{KeyEnvelope, WrappedKey};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{check_genesis, LedgerStore};

/// How long a writer waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const RECORD_COLUMNS: &str = "loan_id, seq, status, previous_hash, hash, ciphertext, nonce,
     timestamp, applicant_id, institution_id, institution_name, intermediary_id";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn conversion_error(
    idx: usize,
    ty: Type,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

// Helper to convert a row (selected with RECORD_COLUMNS) to a LoanRecord
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<LoanRecord> {
    let loan_id: String = row.get(0)?;
    let seq: i64 = row.get(1)?;
    let status: String = row.get(2)?;
    let previous_hash: String = row.get(3)?;
    let hash: String = row.get(4)?;
    let nonce: Vec<u8> = row.get(6)?;
    let applicant_id: String = row.get(8)?;
    let institution_id: String = row.get(9)?;
    let intermediary_id: Option<String> = row.get(11)?;

    Ok(LoanRecord {
        loan_id: LoanId::parse(&loan_id).map_err(|e| conversion_error(0, Type::Text, e))?,
        seq: seq as u64,
        status: status
            .parse::<LoanStatus>()
            .map_err(|e| conversion_error(2, Type::Text, e))?,
        metadata: SealedMetadata {
            ciphertext: row.get(5)?,
            nonce: Nonce::try_from(nonce.as_slice())
                .map_err(|e| conversion_error(6, Type::Blob, e))?,
        },
        previous_hash: LinkHash::from_hex(&previous_hash)
            .map_err(|e| conversion_error(3, Type::Text, e))?,
        hash: LinkHash::from_hex(&hash).map_err(|e| conversion_error(4, Type::Text, e))?,
        timestamp: row.get(7)?,
        parties: Parties {
            applicant_id: PrincipalId::new(applicant_id)
                .map_err(|e| conversion_error(8, Type::Text, e))?,
            institution_id: PrincipalId::new(institution_id)
                .map_err(|e| conversion_error(9, Type::Text, e))?,
            institution_name: row.get(10)?,
        },
        intermediary_id: intermediary_id
            .map(IntermediaryId::new)
            .transpose()
            .map_err(|e| conversion_error(11, Type::Text, e))?,
    })
}

fn insert_record(conn: &Connection, record: &LoanRecord) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT INTO loan_records ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            RECORD_COLUMNS
        ),
        params![
            record.loan_id.as_str(),
            record.seq as i64,
            record.status.as_str(),
            record.previous_hash.to_hex(),
            record.hash.to_hex(),
            &record.metadata.ciphertext,
            record.metadata.nonce.as_bytes().as_slice(),
            &record.timestamp,
            record.parties.applicant_id.as_str(),
            record.parties.institution_id.as_str(),
            record.parties.institution_name.as_deref(),
            record.intermediary_id.as_ref().map(|id| id.as_str()),
        ],
    )
}

fn latest_seq(conn: &Connection, loan_id: &str) -> rusqlite::Result<Option<u64>> {
    conn.query_row(
        "SELECT MAX(seq) FROM loan_records WHERE loan_id = ?1",
        params![loan_id],
        |row| row.get::<_, Option<i64>>(0),
    )
    .map(|seq| seq.map(|s| s as u64))
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn insert_principal(&self, principal: &Principal) -> Result<()> {
        let principal = principal.clone();

        self.run(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO principals (id, role, display_name, salt, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    principal.id.as_str(),
                    principal.role.as_str(),
                    principal.display_name.as_deref(),
                    principal.salt.as_bytes().as_slice(),
                    chrono::Utc::now().timestamp_millis(),
                ],
            );
            match inserted {
                Ok(_) => Ok(()),
                Err(e) if is_constraint_violation(&e) => Err(StoreError::AlreadyExists(
                    format!("principal {}", principal.id),
                )),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn get_principal(&self, id: &PrincipalId) -> Result<Option<Principal>> {
        let id = id.clone();

        self.run(move |conn| {
            conn.query_row(
                "SELECT role, display_name, salt FROM principals WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    let role: String = row.get(0)?;
                    let salt: Vec<u8> = row.get(2)?;
                    Ok(Principal {
                        id: id.clone(),
                        role: PrincipalRole::parse(&role).ok_or_else(|| {
                            rusqlite::Error::InvalidColumnType(0, "role".into(), Type::Text)
                        })?,
                        display_name: row.get(1)?,
                        salt: Salt::try_from(salt.as_slice())
                            .map_err(|e| conversion_error(2, Type::Blob, e))?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn insert_intermediary(&self, intermediary: &Intermediary) -> Result<()> {
        let intermediary = intermediary.clone();

        self.run(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO intermediaries (id, name) VALUES (?1, ?2)",
                params![intermediary.id.as_str(), &intermediary.name],
            );
            match inserted {
                Ok(_) => Ok(()),
                Err(e) if is_constraint_violation(&e) => Err(StoreError::AlreadyExists(
                    format!("intermediary {}", intermediary.id),
                )),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn list_intermediaries(&self) -> Result<Vec<Intermediary>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM intermediaries ORDER BY id")?;
            let intermediaries = stmt
                .query_map([], |row| {
                    let id: String = row.get(0)?;
                    Ok(Intermediary {
                        id: IntermediaryId::new(id)
                            .map_err(|e| conversion_error(0, Type::Text, e))?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(intermediaries)
        })
        .await
    }

    async fn create_chain(&self, envelope: &KeyEnvelope, genesis: &LoanRecord) -> Result<()> {
        check_genesis(envelope, genesis)?;
        let envelope = envelope.clone();
        let genesis = genesis.clone();

        self.run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let inserted = tx.execute(
                "INSERT INTO key_envelopes (
                    loan_id, wrapped_applicant, nonce_applicant,
                    wrapped_institution, nonce_institution, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    envelope.loan_id.as_str(),
                    &envelope.applicant.ciphertext,
                    envelope.applicant.nonce.as_bytes().as_slice(),
                    &envelope.institution.ciphertext,
                    envelope.institution.nonce.as_bytes().as_slice(),
                    chrono::Utc::now().timestamp_millis(),
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => {
                    return Err(StoreError::AlreadyExists(format!("loan {}", envelope.loan_id)));
                }
                Err(e) => return Err(e.into()),
            }

            insert_record(&tx, &genesis)?;

            // Dropping the transaction on any early return above rolls back.
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn append_record(&self, record: &LoanRecord) -> Result<()> {
        let record = record.clone();

        self.run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let latest = latest_seq(&tx, record.loan_id.as_str())?
                .ok_or_else(|| StoreError::NotFound(format!("loan {}", record.loan_id)))?;

            let conflict = || StoreError::Conflict {
                loan_id: record.loan_id.to_string(),
                expected: latest + 1,
                got: record.seq,
            };

            if record.seq != latest + 1 {
                return Err(conflict());
            }
            match insert_record(&tx, &record) {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => return Err(conflict()),
                Err(e) => return Err(e.into()),
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn latest_record(&self, loan_id: &LoanId) -> Result<Option<LoanRecord>> {
        let loan_id = loan_id.clone();

        self.run(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM loan_records WHERE loan_id = ?1 ORDER BY seq DESC LIMIT 1",
                    RECORD_COLUMNS
                ),
                params![loan_id.as_str()],
                row_to_record,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get_chain(&self, loan_id: &LoanId) -> Result<Vec<LoanRecord>> {
        let loan_id = loan_id.clone();

        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM loan_records WHERE loan_id = ?1 ORDER BY seq",
                RECORD_COLUMNS
            ))?;
            let records = stmt
                .query_map(params![loan_id.as_str()], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn get_envelope(&self, loan_id: &LoanId) -> Result<Option<KeyEnvelope>> {
        let loan_id = loan_id.clone();

        self.run(move |conn| {
            let row: Option<(Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>)> = conn
                .query_row(
                    "SELECT wrapped_applicant, nonce_applicant, wrapped_institution, nonce_institution
                     FROM key_envelopes WHERE loan_id = ?1",
                    params![loan_id.as_str()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()?;

            let Some((wrapped_a, nonce_a, wrapped_b, nonce_b)) = row else {
                return Ok(None);
            };

            let nonce = |bytes: &[u8]| {
                Nonce::try_from(bytes).map_err(|e| StoreError::InvalidData(e.to_string()))
            };

            Ok(Some(KeyEnvelope {
                applicant: WrappedKey {
                    ciphertext: wrapped_a,
                    nonce: nonce(&nonce_a)?,
                },
                institution: WrappedKey {
                    ciphertext: wrapped_b,
                    nonce: nonce(&nonce_b)?,
                },
                loan_id,
            }))
        })
        .await
    }

    async fn list_loans(&self, principal: &PrincipalId) -> Result<Vec<LoanId>> {
        let principal = principal.clone();

        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT loan_id FROM loan_records
                 WHERE seq = 1 AND (applicant_id = ?1 OR institution_id = ?1)
                 ORDER BY timestamp, loan_id",
            )?;
            let loans = stmt
                .query_map(params![principal.as_str()], |row| {
                    let id: String = row.get(0)?;
                    LoanId::parse(&id).map_err(|e| conversion_error(0, Type::Text, e))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(loans)
        })
        .await
    }
}
