use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use common::counters::Counters;
use common::err::{CResult, CoreError};
use common::model::LogEntry;
use queue::WriteQueue;
use socket2::{Domain, Socket, Type};
use tracing::{debug, warn};

use crate::receiver::Receiver;

const MAX_DATAGRAM: usize = 65_536;

/// A UDP front shared by the syslog and SNMP receivers: bind with address
/// reuse, read one datagram at a time, hand it to `parse`, enqueue on
/// success, drop silently on a parse failure.
pub struct DatagramReceiver {
    name: &'static str,
    port: u16,
    socket: Option<UdpSocket>,
    parse: fn(&[u8]) -> CResult<LogEntry>,
    queue: Arc<WriteQueue>,
    counters: Arc<Counters>,
}

impl DatagramReceiver {
    pub fn syslog(port: u16, queue: Arc<WriteQueue>, counters: Arc<Counters>) -> Self {
        DatagramReceiver {
            name: "syslog",
            port,
            socket: None,
            parse: ingest::syslog::parse,
            queue,
            counters,
        }
    }

    pub fn snmp(port: u16, queue: Arc<WriteQueue>, counters: Arc<Counters>) -> Self {
        DatagramReceiver {
            name: "snmp",
            port,
            socket: None,
            parse: ingest::snmp::parse,
            queue,
            counters,
        }
    }
}

impl Receiver for DatagramReceiver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn start(&mut self) -> CResult<()> {
        let addr: SocketAddr = ([0, 0, 0, 0], self.port).into();

        let socket = Socket::new(Domain::IPV4, Type::DGRAM, None).map_err(CoreError::Io)?;
        socket.set_reuse_address(true).map_err(CoreError::Io)?;
        socket.bind(&addr.into()).map_err(CoreError::Io)?;
        socket.set_nonblocking(true).map_err(CoreError::Io)?;

        self.socket = Some(socket.into());
        tracing::info!(receiver = self.name, port = self.port, "receiver bound");
        Ok(())
    }

    fn poll_once(&self) -> bool {
        let Some(socket) = &self.socket else {
            return false;
        };

        let mut buf = [0u8; MAX_DATAGRAM];
        match socket.recv_from(&mut buf) {
            Ok((n, _addr)) => {
                self.counters.add_received(1);
                match (self.parse)(&buf[..n]) {
                    Ok(entry) => {
                        if let Err(e) = self.queue.enqueue(entry) {
                            warn!(receiver = self.name, error = %e, "enqueue failed");
                            self.counters.add_error();
                        }
                    }
                    Err(e) => {
                        debug!(receiver = self.name, error = %e, "dropping malformed datagram");
                        self.counters.add_error();
                    }
                }
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => false,
            Err(e) => {
                warn!(receiver = self.name, error = %e, "recv_from failed");
                false
            }
        }
    }

    fn stop(&mut self) {
        self.socket = None;
    }
}
