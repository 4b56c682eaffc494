pub const CREATE_LOGS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS logs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp   INTEGER NOT NULL,
    level       INTEGER NOT NULL,
    source      INTEGER NOT NULL,
    host        TEXT NOT NULL,
    facility    INTEGER,
    app_name    TEXT,
    proc_id     TEXT,
    msg_id      TEXT,
    message     TEXT NOT NULL,
    raw_data    BLOB NOT NULL,
    hmac        BLOB NOT NULL,
    created_at  INTEGER NOT NULL
);
"#;

pub const CREATE_INDEX_TIMESTAMP_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs (timestamp);";
pub const CREATE_INDEX_LEVEL_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_logs_level ON logs (level);";
pub const CREATE_INDEX_SOURCE_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_logs_source ON logs (source);";
pub const CREATE_INDEX_HOST_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_logs_host ON logs (host);";
pub const CREATE_INDEX_APP_NAME_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_logs_app_name ON logs (app_name);";

pub fn schema_ddl() -> String {
    [
        CREATE_LOGS_TABLE_SQL,
        CREATE_INDEX_TIMESTAMP_SQL,
        CREATE_INDEX_LEVEL_SQL,
        CREATE_INDEX_SOURCE_SQL,
        CREATE_INDEX_HOST_SQL,
        CREATE_INDEX_APP_NAME_SQL,
    ]
    .join("\n")
}
