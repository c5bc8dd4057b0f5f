//! BIP-39 mnemonics and mini-secret derivation

use bip39::{Language, Mnemonic};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha512;

use super::AccountError;

/// Length of an sr25519 mini-secret in bytes
pub const MINI_SECRET_LENGTH: usize = 32;

/// 128 bits of entropy gives a 12 word phrase
const ENTROPY_LENGTH: usize = 16;

const PBKDF2_ROUNDS: u32 = 2048;

/// Generate a fresh 12 word English mnemonic
pub fn generate_mnemonic() -> Result<String, AccountError> {
    let mut entropy = [0u8; ENTROPY_LENGTH];
    rand::rng().fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| AccountError::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}

/// Parse a phrase, tolerating extra whitespace and upper case
pub(crate) fn parse_mnemonic(phrase: &str) -> Result<Mnemonic, AccountError> {
    let normalized = phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| AccountError::InvalidMnemonic(e.to_string()))
}

/// Canonical substrate derivation of a mnemonic into a mini-secret.
///
/// The phrase's entropy (not its seed) is stretched with
/// PBKDF2-HMAC-SHA512 using the salt `"mnemonic"` and 2048 rounds; the first
/// 32 bytes of the output are the mini-secret.
pub fn mnemonic_to_mini_secret(phrase: &str) -> Result<[u8; MINI_SECRET_LENGTH], AccountError> {
    let mnemonic = parse_mnemonic(phrase)?;
    Ok(mini_secret_from_entropy(&mnemonic.to_entropy(), ""))
}

pub(crate) fn mini_secret_from_entropy(
    entropy: &[u8],
    password: &str,
) -> [u8; MINI_SECRET_LENGTH] {
    let salt = format!("mnemonic{password}");
    let mut seed = [0u8; 64];
    pbkdf2_hmac::<Sha512>(entropy, salt.as_bytes(), PBKDF2_ROUNDS, &mut seed);

    let mut mini_secret = [0u8; MINI_SECRET_LENGTH];
    mini_secret.copy_from_slice(&seed[..MINI_SECRET_LENGTH]);
    mini_secret
}
