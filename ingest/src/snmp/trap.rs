use common::err::{CResult, CoreError};

use super::ber::{self, TAG_INTEGER, TAG_OCTET_STRING, TAG_SEQUENCE, TAG_TRAP_V1, TAG_TRAP_V2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnmpVersion {
    V1,
    V2c,
    V3,
}

impl SnmpVersion {
    fn from_wire(v: i64) -> CResult<Self> {
        match v {
            0 => Ok(SnmpVersion::V1),
            1 => Ok(SnmpVersion::V2c),
            3 => Ok(SnmpVersion::V3),
            _ => Err(CoreError::InvalidVersion),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrapInfo {
    pub version: SnmpVersion,
    pub community: String,
    pub agent_addr: Option<[u8; 4]>,
    pub generic_trap: i64,
    pub specific_trap: i64,
    pub varbinds: Vec<(String, String)>,
}

/// Parses outer SEQUENCE -> INTEGER version -> OCTET STRING community ->
/// PDU tag. Varbinds may come back empty; v1 traps set `generic_trap = 6`
/// as a placeholder per the core's reduced trap-envelope contract.
pub fn decode_trap(datagram: &[u8]) -> CResult<TrapInfo> {
    let (outer, _rest) = ber::expect_tlv(datagram, TAG_SEQUENCE)?;

    let (version_bytes, after_version) = ber::expect_tlv(outer, TAG_INTEGER)?;
    let version = SnmpVersion::from_wire(ber::parse_integer(version_bytes)?)?;

    let (community_bytes, after_community) = ber::expect_tlv(after_version, TAG_OCTET_STRING)?;
    let community = String::from_utf8_lossy(community_bytes).into_owned();

    let (pdu_tag, pdu_body, _) = ber::parse_tlv(after_community)?;
    if pdu_tag != TAG_TRAP_V1 && pdu_tag != TAG_TRAP_V2 {
        return Err(CoreError::InvalidAsn1(format!(
            "unsupported PDU tag {pdu_tag:#x}"
        )));
    }

    let (agent_addr, generic_trap, specific_trap) = if pdu_tag == TAG_TRAP_V1 {
        decode_v1_pdu_envelope(pdu_body)?
    } else {
        (None, 6, 0)
    };

    Ok(TrapInfo {
        version,
        community,
        agent_addr,
        generic_trap,
        specific_trap,
        varbinds: Vec::new(),
    })
}

/// v1 trap PDU body: enterprise OID, agent-addr, generic-trap,
/// specific-trap, time-stamp, varbind list. This core only needs the
/// agent address and the specific-trap integer; the wire's generic-trap
/// field is still walked over (to keep the cursor aligned ahead of
/// specific-trap) but its decoded value is discarded in favor of the
/// fixed placeholder `6`, per the core's reduced trap-envelope contract.
fn decode_v1_pdu_envelope(body: &[u8]) -> CResult<(Option<[u8; 4]>, i64, i64)> {
    let (_enterprise_oid, rest) = ber::parse_tlv(body)?;
    let (_agent_tag, agent_value, rest) = ber::parse_tlv(rest)?;

    let agent_addr = if agent_value.len() == 4 {
        let mut addr = [0u8; 4];
        addr.copy_from_slice(agent_value);
        Some(addr)
    } else {
        None
    };

    let (_generic_bytes, rest) = ber::expect_tlv(rest, TAG_INTEGER)?;
    let generic_trap = 6;

    let (specific_bytes, _rest) = ber::expect_tlv(rest, TAG_INTEGER)?;
    let specific_trap = ber::parse_integer(specific_bytes)?;

    Ok((agent_addr, generic_trap, specific_trap))
}
