use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::config::RepConfig;
use common::counters::Counters;
use common::err::CResult;
use net::{DatagramReceiver, HttpReceiver, Receiver};
use queue::WriteQueue;
use storage::Storage;
use tracing::{info, warn};

/// One receiver plus the name it was registered under, kept together so
/// a bind failure can be logged and the receiver dropped from the active
/// set without losing track of which one it was.
struct Slot {
    name: &'static str,
    receiver: Box<dyn Receiver + Send>,
}

/// Owns the receivers, the write queue, and the shared counters. `start`
/// brings receivers up in order syslog, HTTP, SNMP; `poll` performs one
/// non-blocking round over all of them; `stop` tears them down in
/// reverse order and drains the queue.
pub struct Orchestrator {
    running: Arc<AtomicBool>,
    candidates: Vec<Slot>,
    active: Vec<Slot>,
    queue: Arc<WriteQueue>,
    storage: Arc<Mutex<Storage>>,
    counters: Arc<Counters>,
}

impl Orchestrator {
    pub fn new(config: &RepConfig) -> CResult<Self> {
        let storage = Arc::new(Mutex::new(Storage::open(&config.database)?));
        let counters = Arc::new(Counters::new());
        let queue = Arc::new(WriteQueue::new(
            storage.clone(),
            config.batch_size,
            Duration::from_millis(config.flush_interval_ms),
        ));

        let mut candidates: Vec<Slot> = Vec::new();
        if config.enable_syslog {
            candidates.push(Slot {
                name: "syslog",
                receiver: Box::new(DatagramReceiver::syslog(config.syslog_port, queue.clone(), counters.clone())),
            });
        }
        if config.enable_rest {
            candidates.push(Slot {
                name: "http",
                receiver: Box::new(HttpReceiver::new(config.rest_port, storage.clone(), counters.clone())),
            });
        }
        if config.enable_snmp {
            candidates.push(Slot {
                name: "snmp",
                receiver: Box::new(DatagramReceiver::snmp(config.snmp_port, queue.clone(), counters.clone())),
            });
        }

        Ok(Orchestrator {
            running: Arc::new(AtomicBool::new(false)),
            candidates,
            active: Vec::new(),
            queue,
            storage,
            counters,
        })
    }

    /// Binds every configured receiver. A bind failure disables that one
    /// receiver and logs a warning; it never aborts startup of the
    /// others.
    pub fn start(&mut self) -> CResult<()> {
        for mut slot in self.candidates.drain(..) {
            match slot.receiver.start() {
                Ok(()) => {
                    info!(receiver = slot.name, "receiver started");
                    self.active.push(slot);
                }
                Err(e) => {
                    warn!(receiver = slot.name, error = %e, "receiver failed to start, disabling");
                }
            }
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// One non-blocking round: poll each active receiver once, then let
    /// the queue flush if it's due.
    pub fn poll(&self) -> CResult<usize> {
        for slot in &self.active {
            slot.receiver.poll_once();
        }
        let written = self.queue.try_flush()?;
        if written > 0 {
            self.counters.add_written(written as u64);
            self.counters.add_batch();
        }
        Ok(written)
    }

    /// Flips the running flag and tears receivers down in reverse start
    /// order, then drains whatever the queue is still holding.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        while let Some(mut slot) = self.active.pop() {
            slot.receiver.stop();
            info!(receiver = slot.name, "receiver stopped");
        }
        if let Err(e) = self.queue.force_flush() {
            warn!(error = %e, "final queue drain failed");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn storage(&self) -> &Arc<Mutex<Storage>> {
        &self.storage
    }
}
