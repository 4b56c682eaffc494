use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Service configuration, assembled from (in increasing priority) built-in
/// defaults, an optional TOML file, then CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RepConfig {
    pub database: String,
    pub syslog_port: u16,
    pub rest_port: u16,
    pub snmp_port: u16,
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub enable_syslog: bool,
    pub enable_rest: bool,
    pub enable_snmp: bool,
    pub debug: bool,
    pub log_dir: Option<String>,
}

impl Default for RepConfig {
    fn default() -> Self {
        RepConfig {
            database: "logs.db".to_string(),
            syslog_port: 514,
            rest_port: 8080,
            snmp_port: 162,
            batch_size: 100,
            flush_interval_ms: 1000,
            enable_syslog: true,
            enable_rest: true,
            enable_snmp: true,
            debug: false,
            log_dir: None,
        }
    }
}

/// Loads a config file, falling back to defaults on any I/O or parse
/// failure. Never fatal: a missing or malformed file is logged and
/// defaults are used for every field that couldn't be read, per the
/// core's "config parse failure -> silent default" policy.
pub fn read_config<P: AsRef<Path>>(path: P) -> RepConfig {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config file failed to parse, falling back to defaults");
                RepConfig::default()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config file not readable, falling back to defaults");
            RepConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_spec() {
        let c = RepConfig::default();
        assert_eq!(c.database, "logs.db");
        assert_eq!(c.syslog_port, 514);
        assert_eq!(c.rest_port, 8080);
        assert_eq!(c.snmp_port, 162);
        assert_eq!(c.batch_size, 100);
        assert!(c.enable_syslog && c.enable_rest && c.enable_snmp);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = read_config("/nonexistent/path/does/not/exist.toml");
        assert_eq!(cfg, RepConfig::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not = [valid toml").unwrap();
        let cfg = read_config(f.path());
        assert_eq!(cfg, RepConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "batch_size = 50\nsnmp_port = 1620\n").unwrap();
        let cfg = read_config(f.path());
        assert_eq!(cfg.batch_size, 50);
        assert_eq!(cfg.snmp_port, 1620);
        assert_eq!(cfg.syslog_port, 514);
    }
}
