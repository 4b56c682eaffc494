use common::err::CResult;

/// Common shape every ingestion front shares: bind on `start`, perform
/// exactly one non-blocking unit of work on `poll_once`, tear down on
/// `stop`. The orchestrator calls `poll_once` once per receiver per loop
/// iteration — it never blocks waiting for data.
pub trait Receiver {
    fn name(&self) -> &'static str;

    /// Binds sockets/listeners. A privileged-port bind failure is
    /// recoverable — the caller disables this receiver and keeps going.
    fn start(&mut self) -> CResult<()>;

    /// Drains at most one unit of work (one datagram, one accepted
    /// connection). Returns `true` if something was processed.
    fn poll_once(&self) -> bool;

    fn stop(&mut self);
}
