use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Wall-clock epoch seconds, used for record timestamps. Never use this for
/// flush-interval bookkeeping — see [`monotonic`] for that.
pub fn wall_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs() as i64
}

/// A monotonic instant, for measuring elapsed durations (queue flush
/// timers). Never derive a record `timestamp` from this — it has no
/// relationship to wall-clock epoch seconds.
pub fn monotonic() -> Instant {
    Instant::now()
}
