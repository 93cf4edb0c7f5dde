pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::{Result, anyhow, bail};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, TryLockError};
use std::time::{Duration, Instant};
use tracing::info;

/// Default bound on how long a lookup may wait for the connection.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(250);

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(2);

pub struct Database {
    conn: Mutex<Connection>,
    lookup_timeout: Duration,
}

impl Database {
    pub fn open(path: &Path, lookup_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let db = Self::init(conn, lookup_timeout)?;

        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory(lookup_timeout: Duration) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, lookup_timeout)
    }

    fn init(conn: Connection, lookup_timeout: Duration) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(lookup_timeout)?;

        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            lookup_timeout,
        })
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Run `f` against the connection, giving up once `lookup_timeout` has
    /// passed without acquiring the lock.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let deadline = Instant::now() + self.lookup_timeout;
        loop {
            match self.conn.try_lock() {
                Ok(conn) => return f(&conn),
                Err(TryLockError::Poisoned(e)) => {
                    return Err(anyhow!("DB lock poisoned: {}", e));
                }
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        bail!(
                            "DB connection busy for more than {}ms",
                            self.lookup_timeout.as_millis()
                        );
                    }
                    std::thread::sleep(LOCK_RETRY_INTERVAL);
                }
            }
        }
    }
}

/// Whether `err` is SQLite rejecting a write on a UNIQUE, PRIMARY KEY or
/// other constraint.
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<rusqlite::Error>()
        .and_then(rusqlite::Error::sqlite_error_code)
        == Some(rusqlite::ErrorCode::ConstraintViolation)
}
