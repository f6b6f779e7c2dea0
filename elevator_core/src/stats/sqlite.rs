//! SQLite-backed counter store. Counts survive restarts.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{CounterStore, Distribution, StoreError};

const STATS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS scenario_stats (
  scenario_id TEXT NOT NULL,
  option_index INTEGER NOT NULL,
  count INTEGER NOT NULL DEFAULT 0 CHECK (count >= 0),
  PRIMARY KEY (scenario_id, option_index)
);
"#;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Counter table in a single SQLite database.
pub struct SqliteCounterStore {
    conn: Mutex<Connection>,
}

impl SqliteCounterStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(STATS_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl CounterStore for SqliteCounterStore {
    fn increment(&self, scenario_id: &str, option_index: usize) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO scenario_stats (scenario_id, option_index, count)
             VALUES (?1, ?2, 1)
             ON CONFLICT(scenario_id, option_index)
             DO UPDATE SET count = count + 1",
            params![scenario_id, option_index as i64],
        )?;
        Ok(())
    }

    fn distribution(&self, scenario_id: &str) -> Result<Distribution, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT option_index, count FROM scenario_stats WHERE scenario_id = ?1",
        )?;
        let rows = stmt
            .query_map([scenario_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut counts = Vec::with_capacity(rows.len());
        for (index, count) in rows {
            let index = usize::try_from(index).map_err(|_| StoreError::Corrupt {
                scenario_id: scenario_id.to_string(),
                detail: format!("negative option index {index}"),
            })?;
            let count = u64::try_from(count).map_err(|_| StoreError::Corrupt {
                scenario_id: scenario_id.to_string(),
                detail: format!("negative count {count}"),
            })?;
            counts.push((index, count));
        }

        Ok(Distribution::from_counts(counts))
    }
}
