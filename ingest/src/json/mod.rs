//! Field-targeted JSON log extractor.
//!
//! Deliberately not a general JSON parser: it locates a handful of known
//! keys by scanning for their quoted name, then reads the value that
//! immediately follows. This tolerates any well-formed JSON object shape
//! without needing a full grammar, at the cost of being fooled by a key
//! name appearing inside another field's string value.

use common::err::CResult;
use common::model::{Level, LogEntry, Source};
use common::time::wall_seconds;

/// Extracts a `LogEntry` from an HTTP request body. The full body is
/// retained verbatim as `raw_data`.
pub fn extract(body: &[u8]) -> CResult<LogEntry> {
    let mut entry = LogEntry::new(Source::RestApi, body.to_vec());

    if let Some(message) = find_string_field(body, "message") {
        entry.message = message;
    }
    if let Some(level) = find_string_field(body, "level") {
        entry.level = Level::from_json_str(&level);
    }
    if let Some(host) = find_string_field(body, "host") {
        if !host.is_empty() {
            entry.host = host;
        }
    }
    if let Some(app_name) = find_string_field(body, "app_name") {
        entry.app_name = Some(app_name);
    }
    entry.timestamp = find_integer_field(body, "timestamp").unwrap_or_else(wall_seconds);

    Ok(entry)
}

/// Locates `"key"`, skips whitespace and `:`, expects `"`, then returns
/// the unescaped-aware byte range up to the next unescaped `"`.
fn find_string_field(body: &[u8], key: &str) -> Option<String> {
    let key_pos = find_quoted_key(body, key)?;
    let mut i = key_pos;
    i = skip_whitespace_and_colon(body, i);

    if body.get(i) != Some(&b'"') {
        return None;
    }
    i += 1;
    let start = i;

    while i < body.len() {
        match body[i] {
            b'\\' if i + 1 < body.len() => i += 2,
            b'"' => {
                return Some(String::from_utf8_lossy(&body[start..i]).into_owned());
            }
            _ => i += 1,
        }
    }
    None
}

/// Scans contiguous ASCII decimal digits after the key's colon.
fn find_integer_field(body: &[u8], key: &str) -> Option<i64> {
    let key_pos = find_quoted_key(body, key)?;
    let mut i = skip_whitespace_and_colon(body, key_pos);

    // allow an optional leading minus sign, then digits
    let neg = body.get(i) == Some(&b'-');
    if neg {
        i += 1;
    }
    let start = i;
    while i < body.len() && body[i].is_ascii_digit() {
        i += 1;
    }
    if i == start {
        return None;
    }
    let text = std::str::from_utf8(&body[start..i]).ok()?;
    let value: i64 = text.parse().ok()?;
    Some(if neg { -value } else { value })
}

/// Returns the byte index just past the closing quote of `"key"`.
fn find_quoted_key(body: &[u8], key: &str) -> Option<usize> {
    let needle = format!("\"{key}\"");
    let needle = needle.as_bytes();

    body.windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + needle.len())
}

fn skip_whitespace_and_colon(body: &[u8], mut i: usize) -> usize {
    while body.get(i).map_or(false, |b| b.is_ascii_whitespace()) {
        i += 1;
    }
    if body.get(i) == Some(&b':') {
        i += 1;
    }
    while body.get(i).map_or(false, |b| b.is_ascii_whitespace()) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_json_ingest_scenario() {
        let body = br#"{"message":"Application started","level":"info","host":"server1","app_name":"myapp","timestamp":1700000000}"#;
        let entry = extract(body).unwrap();

        assert_eq!(entry.message, "Application started");
        assert_eq!(entry.level, Level::Info);
        assert_eq!(entry.host, "server1");
        assert_eq!(entry.app_name.as_deref(), Some("myapp"));
        assert_eq!(entry.timestamp, 1700000000);
        assert_eq!(entry.raw_data, body.to_vec());
    }

    #[test]
    fn missing_fields_are_left_at_defaults() {
        let body = br#"{"message":"just a message"}"#;
        let entry = extract(body).unwrap();
        assert_eq!(entry.message, "just a message");
        assert_eq!(entry.host, "unknown");
        assert!(entry.app_name.is_none());
    }

    #[test]
    fn unknown_level_string_defaults_to_info() {
        let body = br#"{"level":"verbose"}"#;
        let entry = extract(body).unwrap();
        assert_eq!(entry.level, Level::Info);
    }

    #[test]
    fn escaped_quote_inside_message_is_not_a_terminator() {
        let body = br#"{"message":"she said \"hi\"","level":"info"}"#;
        let entry = extract(body).unwrap();
        assert_eq!(entry.message, r#"she said \"hi\""#);
    }

    #[test]
    fn field_order_is_irrelevant() {
        let body = br#"{"host":"h1","message":"m1"}"#;
        let entry = extract(body).unwrap();
        assert_eq!(entry.host, "h1");
        assert_eq!(entry.message, "m1");
    }
}
