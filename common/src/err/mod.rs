use thiserror::Error;

/// The single error type crossing every crate boundary in this workspace.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid syslog priority")]
    InvalidPriority,

    #[error("invalid ASN.1/BER encoding: {0}")]
    InvalidAsn1(String),

    #[error("unsupported SNMP version")]
    InvalidVersion,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CResult<T> = Result<T, CoreError>;
