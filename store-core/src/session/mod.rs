//! Session Cache
//!
//! Durable single-slot cache for the identified account, backed by redb.
//! The engine rehydrates the signed-in user from here at startup and
//! rewrites the slot whenever the account's remote document changes.
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `session` | `"cp_session"` | JSON-serialized `UserAccount` |

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::UserAccount;
use thiserror::Error;

/// Single-slot session table: key = fixed session key, value = JSON account
const SESSION_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("session");

const SESSION_KEY: &str = "cp_session";

/// Session cache errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Single-slot persistence for the identified account.
///
/// `set(None)` clears the slot; there is exactly one session per engine
/// instance.
pub trait SessionCache: Send + Sync {
    /// Read the cached account, if any.
    fn get(&self) -> SessionResult<Option<UserAccount>>;

    /// Replace or clear the cached account.
    fn set(&self, account: Option<&UserAccount>) -> SessionResult<()>;
}

/// Shared handle to the session cache
pub type SharedSessionCache = Arc<dyn SessionCache>;

/// Session cache backed by redb
///
/// redb commits with `Durability::Immediate`, so the slot survives process
/// restarts and power loss once `set` returns.
#[derive(Clone)]
pub struct RedbSessionCache {
    db: Arc<Database>,
}

impl RedbSessionCache {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> SessionResult<Self> {
        let db = Database::create(path)?;

        // Create the table so first reads do not fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SESSION_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> SessionResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SESSION_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl std::fmt::Debug for RedbSessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbSessionCache").finish_non_exhaustive()
    }
}

impl SessionCache for RedbSessionCache {
    fn get(&self) -> SessionResult<Option<UserAccount>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSION_TABLE)?;

        match table.get(SESSION_KEY)? {
            Some(value) => {
                let account: UserAccount = serde_json::from_slice(value.value())?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    fn set(&self, account: Option<&UserAccount>) -> SessionResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSION_TABLE)?;
            match account {
                Some(account) => {
                    let value = serde_json::to_vec(account)?;
                    table.insert(SESSION_KEY, value.as_slice())?;
                }
                None => {
                    table.remove(SESSION_KEY)?;
                }
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// Volatile session cache for tests and throwaway embeddings
#[derive(Debug, Default)]
pub struct MemorySessionCache {
    slot: parking_lot::Mutex<Option<UserAccount>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionCache for MemorySessionCache {
    fn get(&self) -> SessionResult<Option<UserAccount>> {
        Ok(self.slot.lock().clone())
    }

    fn set(&self, account: Option<&UserAccount>) -> SessionResult<()> {
        *self.slot.lock() = account.cloned();
        Ok(())
    }
}
