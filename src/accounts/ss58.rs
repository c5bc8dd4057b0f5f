//! SS58 address encoding
//!
//! Only simple (single byte) network prefixes are supported, which covers
//! Polkadot (0), Kusama (2) and the generic substrate prefix (42).

use blake2::{Blake2b512, Digest};

use super::AccountError;

/// Generic substrate network prefix
pub const DEFAULT_PREFIX: u16 = 42;

const CHECKSUM_PREAMBLE: &[u8] = b"SS58PRE";
const CHECKSUM_LENGTH: usize = 2;
const PUBLIC_KEY_LENGTH: usize = 32;
const MAX_SIMPLE_PREFIX: u16 = 63;

/// Encode a public key as an SS58 address
pub fn encode(public_key: &[u8; PUBLIC_KEY_LENGTH], prefix: u16) -> Result<String, AccountError> {
    if prefix > MAX_SIMPLE_PREFIX {
        return Err(AccountError::InvalidAddress(format!(
            "unsupported network prefix {prefix}"
        )));
    }

    let mut payload = Vec::with_capacity(1 + PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH);
    payload.push(prefix as u8);
    payload.extend_from_slice(public_key);

    let hash = checksum(&payload);
    payload.extend_from_slice(&hash[..CHECKSUM_LENGTH]);

    Ok(bs58::encode(payload).into_string())
}

/// Decode an SS58 address into its public key and network prefix
pub fn decode(address: &str) -> Result<([u8; PUBLIC_KEY_LENGTH], u16), AccountError> {
    let data = bs58::decode(address)
        .into_vec()
        .map_err(|e| AccountError::InvalidAddress(format!("{address}: {e}")))?;

    if data.len() != 1 + PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH {
        return Err(AccountError::InvalidAddress(format!(
            "{address}: unexpected length {}",
            data.len()
        )));
    }

    let prefix = data[0] as u16;
    if prefix > MAX_SIMPLE_PREFIX {
        return Err(AccountError::InvalidAddress(format!(
            "{address}: unsupported network prefix {prefix}"
        )));
    }

    let (body, expected) = data.split_at(1 + PUBLIC_KEY_LENGTH);
    if checksum(body)[..CHECKSUM_LENGTH] != *expected {
        return Err(AccountError::InvalidAddress(format!(
            "{address}: checksum mismatch"
        )));
    }

    let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
    public_key.copy_from_slice(&body[1..]);
    Ok((public_key, prefix))
}

fn checksum(payload: &[u8]) -> Vec<u8> {
    let mut hasher = Blake2b512::new();
    hasher.update(CHECKSUM_PREAMBLE);
    hasher.update(payload);
    hasher.finalize().to_vec()
}
