use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Origin channel a `LogEntry` was ingested from.
#[derive(TryFromPrimitive, IntoPrimitive, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Source {
    Syslog = 0,
    RestApi = 1,
    Snmp = 2,
}
