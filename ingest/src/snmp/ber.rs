//! BER (Basic Encoding Rules) TLV primitives — the subset SNMPv1/v2c
//! trap PDUs actually use: length, INTEGER, OCTET STRING, SEQUENCE, OID.

use common::err::{CResult, CoreError};

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_OID: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;
pub const TAG_TRAP_V1: u8 = 0xA4;
pub const TAG_TRAP_V2: u8 = 0xA7;

fn asn1_err(msg: impl Into<String>) -> CoreError {
    CoreError::InvalidAsn1(msg.into())
}

/// Decodes a BER length field. Short form (0-127) is one byte; long form
/// `0x80|n` means the next `n` (<= 4) bytes are the big-endian length.
/// Returns `(length, bytes_consumed)`.
pub fn parse_length(input: &[u8]) -> CResult<(usize, usize)> {
    let first = *input.first().ok_or_else(|| asn1_err("truncated length"))?;

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let n = (first & 0x7f) as usize;
    if n == 0 || n > 4 {
        return Err(asn1_err(format!("unsupported long-form length size {n}")));
    }
    if input.len() < 1 + n {
        return Err(asn1_err("truncated long-form length"));
    }

    let mut length: usize = 0;
    for &b in &input[1..1 + n] {
        length = (length << 8) | b as usize;
    }
    Ok((length, 1 + n))
}

/// Reads one TLV: tag byte, length, and the value slice. Returns the
/// value and whatever trails it.
pub fn parse_tlv(input: &[u8]) -> CResult<(u8, &[u8], &[u8])> {
    let tag = *input.first().ok_or_else(|| asn1_err("truncated tag"))?;
    let (length, len_size) = parse_length(&input[1..])?;
    let value_start = 1 + len_size;
    let value_end = value_start
        .checked_add(length)
        .ok_or_else(|| asn1_err("length overflow"))?;
    if value_end > input.len() {
        return Err(asn1_err("value runs past end of buffer"));
    }
    Ok((tag, &input[value_start..value_end], &input[value_end..]))
}

/// Reads a TLV expected to carry exactly `tag`, erroring otherwise.
pub fn expect_tlv<'a>(input: &'a [u8], tag: u8) -> CResult<(&'a [u8], &'a [u8])> {
    let (found, value, rest) = parse_tlv(input)?;
    if found != tag {
        return Err(asn1_err(format!("expected tag {tag:#x}, found {found:#x}")));
    }
    Ok((value, rest))
}

/// Signed, two's-complement INTEGER from its content bytes.
pub fn parse_integer(value: &[u8]) -> CResult<i64> {
    if value.is_empty() {
        return Err(asn1_err("empty INTEGER"));
    }
    if value.len() > 8 {
        return Err(asn1_err("INTEGER too wide"));
    }
    let negative = value[0] & 0x80 != 0;
    let mut acc: i64 = if negative { -1 } else { 0 };
    for &b in value {
        acc = (acc << 8) | b as i64;
    }
    Ok(acc)
}

/// Dotted-decimal rendering of an OID's content bytes.
pub fn parse_oid(value: &[u8]) -> CResult<String> {
    if value.is_empty() {
        return Err(asn1_err("empty OID"));
    }
    let first = value[0];
    let mut parts = vec![(first / 40) as u32, (first % 40) as u32];

    let mut acc: u32 = 0;
    for &b in &value[1..] {
        acc = (acc << 7) | (b & 0x7f) as u32;
        if b & 0x80 == 0 {
            parts.push(acc);
            acc = 0;
        }
    }

    Ok(parts.iter().map(|p| p.to_string()).collect::<Vec<_>>().join("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_length() {
        let (len, consumed) = parse_length(&[0x05]).unwrap();
        assert_eq!((len, consumed), (5, 1));
    }

    #[test]
    fn long_form_length_three_bytes() {
        let (len, consumed) = parse_length(&[0x82, 0x01, 0x00]).unwrap();
        assert_eq!((len, consumed), (256, 3));
    }

    #[test]
    fn integer_tlv_decodes_to_five() {
        let (tag, value, rest) = parse_tlv(&[0x02, 0x01, 0x05]).unwrap();
        assert_eq!(tag, TAG_INTEGER);
        assert_eq!(parse_integer(value).unwrap(), 5);
        assert!(rest.is_empty());
    }

    #[test]
    fn octet_string_tlv_decodes_to_public() {
        let bytes = [0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c'];
        let (tag, value, rest) = parse_tlv(&bytes).unwrap();
        assert_eq!(tag, TAG_OCTET_STRING);
        assert_eq!(value, b"public");
        assert!(rest.is_empty());
    }

    #[test]
    fn negative_integer_two_complement() {
        // -1 as a single-byte two's-complement INTEGER.
        assert_eq!(parse_integer(&[0xff]).unwrap(), -1);
    }

    #[test]
    fn oid_renders_as_dotted_decimal() {
        // 1.3.6.1.4.1 -> first byte 1*40+3=43=0x2b
        let value = [0x2b, 0x06, 0x01, 0x04, 0x01];
        assert_eq!(parse_oid(&value).unwrap(), "1.3.6.1.4.1");
    }

    #[test]
    fn truncated_buffer_is_invalid_asn1() {
        assert!(parse_tlv(&[0x02, 0x05]).is_err());
    }
}
