//! Sealed-box encryption
//!
//! Layout of a sealed payload:
//!
//! ```text
//! ephemeral X25519 public key (32) | nonce (12) | ChaCha20-Poly1305 ciphertext + tag
//! ```
//!
//! The symmetric key is HMAC-SHA256 over both public keys, keyed by the
//! X25519 shared secret.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};
use x25519_dalek::{PublicKey, StaticSecret};

use super::AccountError;

const KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

/// Bytes added to every plaintext by [`encrypt_for`]
pub const SEAL_OVERHEAD: usize = KEY_LENGTH + NONCE_LENGTH + TAG_LENGTH;

const SECRET_DOMAIN: &[u8] = b"substrate-tests/x25519";
const KDF_DOMAIN: &[u8] = b"substrate-tests/sealed-box";

/// Derive the X25519 encryption secret tied to an account mini-secret
pub(crate) fn encryption_secret(mini_secret: &[u8]) -> StaticSecret {
    let digest = Sha512::new()
        .chain_update(SECRET_DOMAIN)
        .chain_update(mini_secret)
        .finalize();

    let mut bytes = [0u8; KEY_LENGTH];
    bytes.copy_from_slice(&digest[..KEY_LENGTH]);
    StaticSecret::from(bytes)
}

/// Seal `plaintext` to an X25519 public key
pub fn encrypt_for(recipient: &[u8; KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, AccountError> {
    let recipient = PublicKey::from(*recipient);

    let mut ephemeral_bytes = [0u8; KEY_LENGTH];
    rand::rng().fill_bytes(&mut ephemeral_bytes);
    let ephemeral = StaticSecret::from(ephemeral_bytes);
    let ephemeral_public = PublicKey::from(&ephemeral);

    let shared = ephemeral.diffie_hellman(&recipient);
    if !shared.was_contributory() {
        return Err(AccountError::Encryption(
            "recipient key has low order".to_string(),
        ));
    }

    let key = derive_key(shared.as_bytes(), &ephemeral_public, &recipient)
        .map_err(AccountError::Encryption)?;

    let mut nonce = [0u8; NONCE_LENGTH];
    rand::rng().fill_bytes(&mut nonce);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| AccountError::Encryption(e.to_string()))?;

    let mut sealed = Vec::with_capacity(SEAL_OVERHEAD + plaintext.len());
    sealed.extend_from_slice(ephemeral_public.as_bytes());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open a payload sealed to the public half of `secret`
pub(crate) fn decrypt_with(secret: &StaticSecret, sealed: &[u8]) -> Result<Vec<u8>, AccountError> {
    if sealed.len() < SEAL_OVERHEAD {
        return Err(AccountError::Decryption(format!(
            "payload too short: {} bytes",
            sealed.len()
        )));
    }

    let (ephemeral_bytes, rest) = sealed.split_at(KEY_LENGTH);
    let (nonce, ciphertext) = rest.split_at(NONCE_LENGTH);

    let mut ephemeral = [0u8; KEY_LENGTH];
    ephemeral.copy_from_slice(ephemeral_bytes);
    let ephemeral_public = PublicKey::from(ephemeral);
    let own_public = PublicKey::from(secret);

    let shared = secret.diffie_hellman(&ephemeral_public);
    if !shared.was_contributory() {
        return Err(AccountError::Decryption(
            "ephemeral key has low order".to_string(),
        ));
    }

    let key = derive_key(shared.as_bytes(), &ephemeral_public, &own_public)
        .map_err(AccountError::Decryption)?;

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| AccountError::Decryption("authentication failed".to_string()))
}

fn derive_key(
    shared: &[u8],
    ephemeral: &PublicKey,
    recipient: &PublicKey,
) -> Result<[u8; KEY_LENGTH], String> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(shared).map_err(|e| e.to_string())?;
    mac.update(KDF_DOMAIN);
    mac.update(ephemeral.as_bytes());
    mac.update(recipient.as_bytes());

    let mut key = [0u8; KEY_LENGTH];
    key.copy_from_slice(&mac.finalize().into_bytes());
    Ok(key)
}
