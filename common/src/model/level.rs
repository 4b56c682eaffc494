use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Syslog severity, reused verbatim as the record's overall log level.
#[derive(TryFromPrimitive, IntoPrimitive, Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(u8)]
pub enum Level {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    #[default]
    Info = 6,
    Debug = 7,
}

impl Level {
    /// `severity = priority & 7`, mapped to the matching enumerator.
    pub fn from_severity(severity: u8) -> Self {
        Level::try_from(severity & 7).unwrap_or(Level::Info)
    }

    /// Case-sensitive mapping used by the JSON extractor; unknown strings
    /// default to `info` per the field-targeted scan contract.
    pub fn from_json_str(s: &str) -> Self {
        match s {
            "emergency" => Level::Emergency,
            "alert" => Level::Alert,
            "critical" => Level::Critical,
            "error" => Level::Error,
            "warning" => Level::Warning,
            "notice" => Level::Notice,
            "info" => Level::Info,
            "debug" => Level::Debug,
            _ => Level::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_masks_to_three_bits() {
        assert_eq!(Level::from_severity(6) as u8, Level::Info as u8);
        assert_eq!(Level::from_severity(6 | 8) as u8, Level::Info as u8);
    }

    #[test]
    fn unknown_json_level_defaults_to_info() {
        assert_eq!(Level::from_json_str("bogus"), Level::Info);
        assert_eq!(Level::from_json_str("error"), Level::Error);
    }

    #[test]
    fn json_level_match_is_case_sensitive() {
        // "Error" does not match the lowercase arm, so it falls back to info.
        assert_eq!(Level::from_json_str("Error"), Level::Info);
    }
}
