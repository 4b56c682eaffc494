use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide sequentially-consistent counters, shared between the
/// receivers and the orchestrator's 10-second reporting tick. `queued`
/// is deliberately absent here — the queue's own length is the source of
/// truth for that figure.
#[derive(Default)]
pub struct Counters {
    received: AtomicU64,
    written: AtomicU64,
    errors: AtomicU64,
    batch_count: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Counters::default()
    }

    pub fn add_received(&self, n: u64) {
        self.received.fetch_add(n, Ordering::SeqCst);
    }

    pub fn add_written(&self, n: u64) {
        self.written.fetch_add(n, Ordering::SeqCst);
    }

    pub fn add_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_batch(&self) {
        self.batch_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> u64 {
        self.written.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn batch_count(&self) -> u64 {
        self.batch_count.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_accumulate() {
        let c = Counters::new();
        assert_eq!(c.received(), 0);

        c.add_received(3);
        c.add_written(2);
        c.add_error();
        c.add_batch();

        assert_eq!(c.received(), 3);
        assert_eq!(c.written(), 2);
        assert_eq!(c.errors(), 1);
        assert_eq!(c.batch_count(), 1);
    }
}
