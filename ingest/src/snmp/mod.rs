mod ber;
mod trap;

pub use trap::{SnmpVersion, TrapInfo};

use common::err::CResult;
use common::model::{Level, LogEntry, Source};

/// Decodes an SNMP v1/v2c trap datagram into a `LogEntry`. Any BER
/// inconsistency propagates as an error so the caller can drop the
/// datagram silently, per the core's UDP-receiver failure policy.
pub fn parse(datagram: &[u8]) -> CResult<LogEntry> {
    let trap = trap::decode_trap(datagram)?;

    let mut entry = LogEntry::new(Source::Snmp, datagram.to_vec());
    entry.level = Level::Notice;
    entry.app_name = Some("snmptrapd".to_string());
    entry.host = trap
        .agent_addr
        .map(|a| format!("{}.{}.{}.{}", a[0], a[1], a[2], a[3]))
        .unwrap_or_else(|| "unknown".to_string());
    entry.message = format_trap_message(&trap);

    Ok(entry)
}

fn format_trap_message(trap: &TrapInfo) -> String {
    let mut message = format!(
        "Trap Type: {} Specific: {}",
        trap.generic_trap, trap.specific_trap
    );
    for (oid, value) in &trap.varbinds {
        message.push_str(&format!(" [{oid}={value}]"));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn len_byte(n: usize) -> Vec<u8> {
        vec![n as u8]
    }

    fn tlv(tag: u8, value: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        out.extend(len_byte(value.len()));
        out.extend_from_slice(value);
        out
    }

    fn build_v1_trap() -> Vec<u8> {
        let enterprise = tlv(0x06, &[0x2b, 0x06, 0x01, 0x04, 0x01]);
        let agent = tlv(0x40, &[10, 0, 0, 5]);
        let generic = tlv(0x02, &[6]);
        let specific = tlv(0x02, &[1]);
        let timestamp = tlv(0x02, &[0]);
        let varbinds = tlv(0x30, &[]);

        let mut pdu_body = Vec::new();
        pdu_body.extend(enterprise);
        pdu_body.extend(agent);
        pdu_body.extend(generic);
        pdu_body.extend(specific);
        pdu_body.extend(timestamp);
        pdu_body.extend(varbinds);
        let pdu = tlv(0xA4, &pdu_body);

        let version = tlv(0x02, &[0]);
        let community = tlv(0x04, b"public");

        let mut seq_body = Vec::new();
        seq_body.extend(version);
        seq_body.extend(community);
        seq_body.extend(pdu);
        tlv(0x30, &seq_body)
    }

    #[test]
    fn trap_maps_to_log_entry() {
        let datagram = build_v1_trap();
        let entry = parse(&datagram).unwrap();

        assert_eq!(entry.source, Source::Snmp);
        assert_eq!(entry.level, Level::Notice);
        assert_eq!(entry.app_name.as_deref(), Some("snmptrapd"));
        assert_eq!(entry.host, "10.0.0.5");
        assert_eq!(entry.message, "Trap Type: 6 Specific: 1");
        assert_eq!(entry.raw_data, datagram);
    }

    #[test]
    fn malformed_datagram_is_dropped_as_error() {
        assert!(parse(&[0xff, 0xff]).is_err());
    }
}
