use byteorder::{LittleEndian, WriteBytesExt};
use sha2::{Digest, Sha256};

pub const ZERO_HMAC: [u8; 32] = [0u8; 32];

/// `SHA256(raw_data ‖ le64(id)) XOR prev_hmac`.
pub fn chain_hmac(raw_data: &[u8], id: i64, prev_hmac: &[u8; 32]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(raw_data.len() + 8);
    buf.extend_from_slice(raw_data);
    buf.write_i64::<LittleEndian>(id).expect("write to Vec never fails");

    let mut hasher = Sha256::new();
    hasher.update(&buf);
    let digest = hasher.finalize();

    let mut out = [0u8; 32];
    for i in 0..32 {
        out[i] = digest[i] ^ prev_hmac[i];
    }
    out
}
