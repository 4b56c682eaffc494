//! RFC 3164 syslog datagram parser.

use common::err::{CResult, CoreError};
use common::model::{Level, LogEntry, Source};
use common::time::wall_seconds;
use nom::bytes::complete::tag;
use nom::character::complete::satisfy;
use nom::combinator::{map_res, recognize};
use nom::multi::many_m_n;
use nom::sequence::delimited;
use nom::IResult;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const DAYS_BEFORE_MONTH: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_SYNTHETIC_YEAR: i64 = 31_536_000;

/// Parses a single RFC 3164 datagram into a `LogEntry`. `raw_data` is the
/// entire unparsed payload, byte-exact.
pub fn parse(datagram: &[u8]) -> CResult<LogEntry> {
    let (priority, rest) = parse_priority(datagram)?;
    let facility = priority >> 3;
    let severity = priority & 7;

    let (timestamp, rest) = parse_timestamp(rest);
    let (host, rest) = parse_hostname(rest);
    let (app_name, proc_id, rest) = parse_app_proc(rest);
    let message = String::from_utf8_lossy(rest).into_owned();

    let mut entry = LogEntry::new(Source::Syslog, datagram.to_vec());
    entry.level = Level::from_severity(severity);
    entry.facility = Some(facility);
    entry.timestamp = timestamp.unwrap_or_else(wall_seconds);
    entry.host = if host.is_empty() { "unknown".to_string() } else { host };
    entry.app_name = app_name;
    entry.proc_id = proc_id;
    entry.message = message;

    Ok(entry)
}

fn priority_digits(input: &str) -> IResult<&str, &str> {
    recognize(many_m_n(1, 3, satisfy(|c: char| c.is_ascii_digit())))(input)
}

/// `<DDD>` where DDD is 1-3 ASCII decimal digits, value 0-255.
fn parse_priority(input: &[u8]) -> CResult<(u8, &[u8])> {
    let text = std::str::from_utf8(input).map_err(|_| CoreError::InvalidPriority)?;

    let parsed: IResult<&str, u8> = delimited(
        tag("<"),
        map_res(priority_digits, |s: &str| {
            s.parse::<u16>().ok().filter(|v| *v <= 255).map(|v| v as u8).ok_or(())
        }),
        tag(">"),
    )(text);

    match parsed {
        Ok((rest, value)) => {
            let consumed = text.len() - rest.len();
            Ok((value, &input[consumed..]))
        }
        Err(_) => Err(CoreError::InvalidPriority),
    }
}

/// Exactly `MMM DD HH:MM:SS` (15 bytes). If the shape doesn't match,
/// returns `None` and leaves `input` untouched (parsing resumes at the
/// same position).
fn parse_timestamp(input: &[u8]) -> (Option<i64>, &[u8]) {
    if input.len() < 15 {
        return (None, input);
    }
    let (candidate, rest) = input.split_at(15);
    match decode_timestamp(candidate) {
        Some(epoch) => (Some(epoch), skip_one_leading_space(rest)),
        None => (None, input),
    }
}

fn skip_one_leading_space(input: &[u8]) -> &[u8] {
    if input.first() == Some(&b' ') {
        &input[1..]
    } else {
        input
    }
}

/// Like `skip_one_leading_space`, but also consumes a leading colon —
/// the hostname field's other valid terminator.
fn skip_one_leading_separator(input: &[u8]) -> &[u8] {
    match input.first() {
        Some(&b' ') | Some(&b':') => &input[1..],
        _ => input,
    }
}

fn decode_timestamp(candidate: &[u8]) -> Option<i64> {
    let text = std::str::from_utf8(candidate).ok()?;
    let bytes = text.as_bytes();

    let month_str = &text[0..3];
    let month_idx = MONTHS.iter().position(|m| *m == month_str)?;

    if bytes[3] != b' ' {
        return None;
    }

    let day_str = &text[4..6];
    let day: i64 = if day_str.starts_with(' ') {
        day_str[1..].parse().ok()?
    } else {
        day_str.parse().ok()?
    };

    if bytes[6] != b' ' {
        return None;
    }
    if bytes[9] != b':' || bytes[12] != b':' {
        return None;
    }

    let hh: i64 = text[7..9].parse().ok()?;
    let mm: i64 = text[10..12].parse().ok()?;
    let ss: i64 = text[13..15].parse().ok()?;

    if !(1..=31).contains(&day) || hh > 23 || mm > 59 || ss > 59 {
        return None;
    }

    let now = wall_seconds();
    let year_start = (now / SECONDS_PER_SYNTHETIC_YEAR) * SECONDS_PER_SYNTHETIC_YEAR;

    Some(
        year_start
            + DAYS_BEFORE_MONTH[month_idx] * SECONDS_PER_DAY
            + (day - 1) * SECONDS_PER_DAY
            + hh * 3600
            + mm * 60
            + ss,
    )
}

/// Characters up to the first space or colon; empty becomes "unknown"
/// by the caller. Either terminator is consumed — a bare colon is a
/// grammar-legal hostname/tag boundary just like a space.
fn parse_hostname(input: &[u8]) -> (String, &[u8]) {
    let end = input
        .iter()
        .position(|&b| b == b' ' || b == b':')
        .unwrap_or(input.len());
    let host = String::from_utf8_lossy(&input[..end]).into_owned();
    let rest = &input[end..];
    (host, skip_one_leading_separator(rest))
}

/// App name token up to `[`, `:`, or space; `[...]` becomes `proc_id`.
/// Trailing colon(s) and spaces are consumed.
fn parse_app_proc(input: &[u8]) -> (Option<String>, Option<String>, &[u8]) {
    let end = input
        .iter()
        .position(|&b| b == b'[' || b == b':' || b == b' ')
        .unwrap_or(input.len());

    if end == 0 {
        return (None, None, skip_separators(input));
    }

    let app_name = String::from_utf8_lossy(&input[..end]).into_owned();
    let mut rest = &input[end..];

    let mut proc_id = None;
    if rest.first() == Some(&b'[') {
        if let Some(close) = rest.iter().position(|&b| b == b']') {
            proc_id = Some(String::from_utf8_lossy(&rest[1..close]).into_owned());
            rest = &rest[close + 1..];
        }
    }

    (Some(app_name), proc_id, skip_separators(rest))
}

fn skip_separators(input: &[u8]) -> &[u8] {
    let mut i = 0;
    while i < input.len() && (input[i] == b':' || input[i] == b' ') {
        i += 1;
    }
    &input[i..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_only() {
        // No separator anywhere after the priority, so "Test" is consumed
        // whole as the hostname token (terminator defaults to end of
        // input) rather than left as the message; only priority decoding
        // is asserted here per the scenario this covers.
        let entry = parse(b"<134>Test").unwrap();
        assert_eq!(entry.facility, Some(16));
        assert_eq!(entry.level as u8, 6);
    }

    #[test]
    fn full_rfc3164_message() {
        let entry = parse(b"<134>Jan 15 12:34:56 myhost myapp[1234]: Test message").unwrap();
        assert_eq!(entry.host, "myhost");
        assert_eq!(entry.app_name.as_deref(), Some("myapp"));
        assert_eq!(entry.proc_id.as_deref(), Some("1234"));
        assert_eq!(entry.message, "Test message");
    }

    #[test]
    fn missing_priority_is_an_error() {
        assert!(parse(b"no priority here").is_err());
    }

    #[test]
    fn malformed_timestamp_shape_is_skipped_not_dropped() {
        // 15 bytes after the priority, but not a valid timestamp shape —
        // parsing must continue at the same position rather than failing.
        let entry = parse(b"<13>not-a-timestamp host: hi").unwrap();
        assert_eq!(entry.host, "not-a-timestamp");
    }

    #[test]
    fn hostname_defaults_to_unknown_when_absent() {
        let entry = parse(b"<13>:message only").unwrap();
        assert_eq!(entry.host, "unknown");
    }

    #[test]
    fn colon_terminated_hostname_with_no_space_before_tag() {
        // Hostname terminated by ':' directly, no space before the tag —
        // grammar-legal per the hostname field's documented terminators.
        let entry = parse(b"<13>host:app[1]: msg").unwrap();
        assert_eq!(entry.host, "host");
        assert_eq!(entry.app_name.as_deref(), Some("app"));
        assert_eq!(entry.proc_id.as_deref(), Some("1"));
        assert_eq!(entry.message, "msg");
    }

    #[test]
    fn raw_data_is_byte_exact_whole_datagram() {
        let datagram = b"<134>Test message";
        let entry = parse(datagram).unwrap();
        assert_eq!(entry.raw_data, datagram.to_vec());
    }
}
