use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use common::err::CResult;
use common::model::LogEntry;
use storage::Storage;
use tracing::{info, warn};

/// Mutex-guarded staging area that coalesces entries into transactional
/// bulk inserts, flushed on size or time triggers. Holds no capacity cap
/// — backpressure is the caller's responsibility.
pub struct WriteQueue {
    storage: Arc<Mutex<Storage>>,
    buffer: Mutex<VecDeque<LogEntry>>,
    batch_size: usize,
    flush_interval: Duration,
    last_flush: Mutex<Instant>,
}

impl WriteQueue {
    pub fn new(storage: Arc<Mutex<Storage>>, batch_size: usize, flush_interval: Duration) -> Self {
        WriteQueue {
            storage,
            buffer: Mutex::new(VecDeque::new()),
            batch_size,
            flush_interval,
            last_flush: Mutex::new(Instant::now()),
        }
    }

    /// Appends under lock; flushes immediately, still holding the lock,
    /// once `len >= batch_size`.
    pub fn enqueue(&self, entry: LogEntry) -> CResult<usize> {
        let mut buf = self.buffer.lock().unwrap();
        buf.push_back(entry);
        if buf.len() >= self.batch_size {
            self.flush_locked(&mut buf)
        } else {
            Ok(0)
        }
    }

    pub fn enqueue_batch(&self, entries: Vec<LogEntry>) -> CResult<usize> {
        let mut buf = self.buffer.lock().unwrap();
        buf.extend(entries);
        if buf.len() >= self.batch_size {
            self.flush_locked(&mut buf)
        } else {
            Ok(0)
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if the flush interval has elapsed (monotonic clock — never
    /// wall-clock seconds) or the buffer is at/above `batch_size`.
    pub fn should_flush(&self) -> bool {
        let due = self.last_flush.lock().unwrap().elapsed() >= self.flush_interval;
        due || self.len() >= self.batch_size
    }

    /// No-op unless `should_flush()`.
    pub fn try_flush(&self) -> CResult<usize> {
        if !self.should_flush() {
            return Ok(0);
        }
        self.flush()
    }

    /// Unconditional flush.
    pub fn flush(&self) -> CResult<usize> {
        let mut buf = self.buffer.lock().unwrap();
        self.flush_locked(&mut buf)
    }

    pub fn force_flush(&self) -> CResult<usize> {
        self.flush()
    }

    fn flush_locked(&self, buf: &mut VecDeque<LogEntry>) -> CResult<usize> {
        let entries: Vec<LogEntry> = buf.drain(..).collect();
        let written = {
            let mut storage = self.storage.lock().unwrap();
            storage.insert_batch(&entries)?
        };
        *self.last_flush.lock().unwrap() = Instant::now();
        if written > 0 {
            info!(written, "queue flushed");
        }
        Ok(written)
    }
}

impl Drop for WriteQueue {
    fn drop(&mut self) {
        if let Err(e) = self.force_flush() {
            warn!(error = %e, "best-effort flush on drop failed");
        }
    }
}
