mod level;
mod source;

pub use level::Level;
pub use source::Source;

/// Canonical in-memory record produced by every ingestion path.
///
/// `id` and `hmac` are only populated once the entry has been persisted by
/// `Storage::insert`/`insert_batch`; every ingestion path constructs an
/// entry with both left at their default (`None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: Option<i64>,
    pub timestamp: i64,
    pub level: Level,
    pub source: Source,
    pub host: String,
    pub facility: Option<u8>,
    pub app_name: Option<String>,
    pub proc_id: Option<String>,
    pub msg_id: Option<String>,
    pub message: String,
    pub raw_data: Vec<u8>,
    pub hmac: Option<[u8; 32]>,
}

impl LogEntry {
    /// Builds an entry with the defaults every parser falls back to:
    /// `host = "unknown"`, `timestamp = now`, empty message.
    pub fn new(source: Source, raw_data: Vec<u8>) -> Self {
        LogEntry {
            id: None,
            timestamp: crate::time::wall_seconds(),
            level: Level::Info,
            source,
            host: "unknown".to_string(),
            facility: None,
            app_name: None,
            proc_id: None,
            msg_id: None,
            message: String::new(),
            raw_data,
            hmac: None,
        }
    }
}
