use std::path::Path;

use common::err::{CResult, CoreError};
use common::model::{Level, LogEntry, Source};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use crate::chain::{chain_hmac, ZERO_HMAC};
use crate::schema::schema_ddl;

const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Embedded tamper-evident log store. Not `Send`/`Sync` on its own —
/// callers that need to share a `Storage` across threads (the HTTP
/// receiver and the write-queue flush both do) wrap it in
/// `Arc<Mutex<Storage>>`, which is the "serializing wrapper" the core's
/// concurrency model calls for.
pub struct Storage {
    conn: Connection,
    prev_hmac: [u8; 32],
}

impl Storage {
    /// Opens (creating if absent) the database at `path`, applies the
    /// schema, and resumes the HMAC chain from the last persisted row.
    pub fn open<P: AsRef<Path>>(path: P) -> CResult<Self> {
        let conn = Connection::open(path).map_err(sql_err)?;

        conn.pragma_update(None, "journal_mode", "WAL").map_err(sql_err)?;
        conn.pragma_update(None, "synchronous", "NORMAL").map_err(sql_err)?;
        conn.busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS as u64))
            .map_err(sql_err)?;
        conn.execute_batch(&schema_ddl()).map_err(sql_err)?;

        let prev_hmac = load_prev_hmac(&conn)?;

        Ok(Storage { conn, prev_hmac })
    }

    /// Inserts a single entry, returning the assigned id. Handles the
    /// rare chain-id race (concurrent writer against the same database
    /// file) via the self-healing UPDATE path.
    pub fn insert(&mut self, entry: &LogEntry) -> CResult<i64> {
        let expected_id = self.next_id()?;
        let h = chain_hmac(&entry.raw_data, expected_id, &self.prev_hmac);

        let level: u8 = entry.level.into();
        let source: u8 = entry.source.into();
        let created_at = common::time::wall_seconds();

        self.conn
            .execute(
                "INSERT INTO logs (timestamp, level, source, host, facility, app_name, proc_id, \
                 msg_id, message, raw_data, hmac, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    entry.timestamp,
                    level,
                    source,
                    entry.host,
                    entry.facility,
                    entry.app_name,
                    entry.proc_id,
                    entry.msg_id,
                    entry.message,
                    entry.raw_data,
                    h.to_vec(),
                    created_at,
                ],
            )
            .map_err(sql_err)?;

        let actual_id = self.conn.last_insert_rowid();

        if actual_id == expected_id {
            self.prev_hmac = h;
            Ok(actual_id)
        } else {
            warn!(expected_id, actual_id, "chain id mismatch, self-healing hmac");
            let corrected = chain_hmac(&entry.raw_data, actual_id, &self.prev_hmac);
            self.conn
                .execute(
                    "UPDATE logs SET hmac = ?1 WHERE id = ?2",
                    params![corrected.to_vec(), actual_id],
                )
                .map_err(sql_err)?;
            self.prev_hmac = corrected;
            Ok(actual_id)
        }
    }

    /// Inserts all entries inside one transaction, rolling back entirely
    /// on the first failure. Returns the number of rows committed.
    pub fn insert_batch(&mut self, entries: &[LogEntry]) -> CResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let saved_prev_hmac = self.prev_hmac;
        self.conn.execute_batch("BEGIN").map_err(sql_err)?;

        let mut written = 0usize;
        for entry in entries {
            match self.insert(entry) {
                Ok(_) => written += 1,
                Err(e) => {
                    self.conn.execute_batch("ROLLBACK").map_err(sql_err)?;
                    self.prev_hmac = saved_prev_hmac;
                    return Err(e);
                }
            }
        }

        self.conn.execute_batch("COMMIT").map_err(sql_err)?;
        info!(written, "batch committed");
        Ok(written)
    }

    pub fn get_log_count(&self) -> CResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))
            .map_err(sql_err)
    }

    /// Rows in `[lo, hi]` by timestamp, newest first, capped at `limit`.
    /// Text and blob columns are copied out so the caller owns the result.
    pub fn query_by_time_range(&self, lo: i64, hi: i64, limit: i64) -> CResult<Vec<LogEntry>> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT id, timestamp, level, source, host, facility, app_name, proc_id, \
                 msg_id, message, raw_data, hmac FROM logs \
                 WHERE timestamp BETWEEN ?1 AND ?2 ORDER BY timestamp DESC LIMIT ?3",
            )
            .map_err(sql_err)?;

        let rows = stmt
            .query_map(params![lo, hi, limit], |row| {
                let level_raw: u8 = row.get(2)?;
                let source_raw: u8 = row.get(3)?;
                let hmac_bytes: Vec<u8> = row.get(11)?;
                let mut hmac = [0u8; 32];
                if hmac_bytes.len() == 32 {
                    hmac.copy_from_slice(&hmac_bytes);
                }

                Ok(LogEntry {
                    id: Some(row.get(0)?),
                    timestamp: row.get(1)?,
                    level: Level::try_from(level_raw).unwrap_or(Level::Info),
                    source: Source::try_from(source_raw).unwrap_or(Source::Syslog),
                    host: row.get(4)?,
                    facility: row.get(5)?,
                    app_name: row.get(6)?,
                    proc_id: row.get(7)?,
                    msg_id: row.get(8)?,
                    message: row.get(9)?,
                    raw_data: row.get(10)?,
                    hmac: Some(hmac),
                })
            })
            .map_err(sql_err)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(sql_err)?);
        }
        Ok(out)
    }

    fn next_id(&self) -> CResult<i64> {
        let max: Option<i64> = self
            .conn
            .query_row("SELECT MAX(id) FROM logs", [], |row| row.get(0))
            .map_err(sql_err)?;
        Ok(max.unwrap_or(0) + 1)
    }
}

/// Warm-start chain resume: the last row's hmac, or the all-zero start of
/// chain if the table is empty or the column came back unreadable.
fn load_prev_hmac(conn: &Connection) -> CResult<[u8; 32]> {
    let last: Option<Vec<u8>> = conn
        .query_row("SELECT hmac FROM logs ORDER BY id DESC LIMIT 1", [], |row| row.get(0))
        .optional()
        .map_err(sql_err)?;

    match last {
        Some(bytes) if bytes.len() == 32 => {
            let mut out = [0u8; 32];
            out.copy_from_slice(&bytes);
            Ok(out)
        }
        Some(_) => {
            warn!("stored hmac has unexpected length, resetting chain to zero");
            Ok(ZERO_HMAC)
        }
        None => Ok(ZERO_HMAC),
    }
}

fn sql_err(e: rusqlite::Error) -> CoreError {
    CoreError::Storage(e.to_string())
}
