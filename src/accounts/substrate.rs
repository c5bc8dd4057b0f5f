//! Substrate sr25519 accounts

use std::fmt;

use schnorrkel::{ExpansionMode, Keypair, MiniSecretKey, PublicKey, Signature};
use serde::{Deserialize, Serialize};
use tracing::debug;
use x25519_dalek::StaticSecret;

use super::encryption::{decrypt_with, encrypt_for, encryption_secret};
use super::mnemonic::{generate_mnemonic, mnemonic_to_mini_secret, MINI_SECRET_LENGTH};
use super::{ss58, Account, AccountError};
use crate::messages::Chain;

/// Signing context used by substrate for sr25519 signatures
const SIGNING_CONTEXT: &[u8] = b"substrate";

const SR25519_CURVE: &str = "sr25519";

/// Signature envelope attached to substrate messages
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstrateSignature {
    pub curve: String,
    /// `0x` prefixed hex of the 64 byte signature
    pub data: String,
}

/// sr25519 account handle
#[derive(Clone)]
pub struct SubstrateAccount {
    keypair: Keypair,
    encryption: StaticSecret,
    address: String,
    ss58_prefix: u16,
}

impl SubstrateAccount {
    /// Build an account from a 32 byte mini-secret
    pub fn from_mini_secret(mini_secret: &[u8]) -> Result<Self, AccountError> {
        let secret = MiniSecretKey::from_bytes(mini_secret)
            .map_err(|e| AccountError::InvalidPrivateKey(e.to_string()))?;
        let keypair = secret.expand_to_keypair(ExpansionMode::Ed25519);
        let address = ss58::encode(&keypair.public.to_bytes(), ss58::DEFAULT_PREFIX)?;

        Ok(Self {
            keypair,
            encryption: encryption_secret(mini_secret),
            address,
            ss58_prefix: ss58::DEFAULT_PREFIX,
        })
    }

    /// Re-encode the address for another network prefix
    pub fn with_ss58_prefix(mut self, prefix: u16) -> Result<Self, AccountError> {
        self.address = ss58::encode(&self.keypair.public.to_bytes(), prefix)?;
        self.ss58_prefix = prefix;
        Ok(self)
    }

    pub fn ss58_prefix(&self) -> u16 {
        self.ss58_prefix
    }

    /// X25519 public key that [`Account::encrypt`] seals to
    pub fn encryption_public_key(&self) -> [u8; 32] {
        x25519_dalek::PublicKey::from(&self.encryption).to_bytes()
    }
}

impl fmt::Debug for SubstrateAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubstrateAccount")
            .field("address", &self.address)
            .field("ss58_prefix", &self.ss58_prefix)
            .finish_non_exhaustive()
    }
}

impl Account for SubstrateAccount {
    fn address(&self) -> &str {
        &self.address
    }

    fn chain(&self) -> Chain {
        Chain::Dot
    }

    fn public_key(&self) -> Vec<u8> {
        self.keypair.public.to_bytes().to_vec()
    }

    fn sign(&self, payload: &[u8]) -> Result<String, AccountError> {
        let signature = self.keypair.sign_simple(SIGNING_CONTEXT, payload);
        let envelope = SubstrateSignature {
            curve: SR25519_CURVE.to_string(),
            data: format!("0x{}", hex::encode(signature.to_bytes())),
        };
        serde_json::to_string(&envelope).map_err(|e| AccountError::InvalidSignature(e.to_string()))
    }

    fn encrypt(&self, content: &[u8]) -> Result<Vec<u8>, AccountError> {
        encrypt_for(&self.encryption_public_key(), content)
    }

    fn decrypt(&self, content: &[u8]) -> Result<Vec<u8>, AccountError> {
        decrypt_with(&self.encryption, content)
    }
}

/// Create a new account together with the mnemonic it was derived from
pub fn new_account() -> Result<(SubstrateAccount, String), AccountError> {
    let mnemonic = generate_mnemonic()?;
    let account = import_account_from_mnemonic(&mnemonic)?;
    debug!("Created substrate account {}", account.address());
    Ok((account, mnemonic))
}

/// Import an account from a BIP-39 mnemonic
pub fn import_account_from_mnemonic(mnemonic: &str) -> Result<SubstrateAccount, AccountError> {
    let mini_secret = mnemonic_to_mini_secret(mnemonic)?;
    SubstrateAccount::from_mini_secret(&mini_secret)
}

/// Import an account from a hex encoded mini-secret (`0x` prefix optional)
pub fn import_account_from_private_key(private_key: &str) -> Result<SubstrateAccount, AccountError> {
    let trimmed = private_key.trim();
    let encoded = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes = hex::decode(encoded).map_err(|e| AccountError::InvalidPrivateKey(e.to_string()))?;
    if bytes.len() != MINI_SECRET_LENGTH {
        return Err(AccountError::InvalidPrivateKey(format!(
            "expected {MINI_SECRET_LENGTH} bytes, got {}",
            bytes.len()
        )));
    }

    SubstrateAccount::from_mini_secret(&bytes)
}

/// Check a substrate signature envelope against the signer's SS58 address
pub fn verify_signature(address: &str, payload: &[u8], signature: &str) -> Result<bool, AccountError> {
    let (public_key, _) = ss58::decode(address)?;

    let envelope: SubstrateSignature = serde_json::from_str(signature)
        .map_err(|e| AccountError::InvalidSignature(e.to_string()))?;
    if envelope.curve != SR25519_CURVE {
        return Err(AccountError::InvalidSignature(format!(
            "unsupported curve {}",
            envelope.curve
        )));
    }

    let raw = hex::decode(envelope.data.trim_start_matches("0x"))
        .map_err(|e| AccountError::InvalidSignature(e.to_string()))?;
    let signature =
        Signature::from_bytes(&raw).map_err(|e| AccountError::InvalidSignature(e.to_string()))?;
    let public_key = PublicKey::from_bytes(&public_key)
        .map_err(|e| AccountError::InvalidAddress(e.to_string()))?;

    Ok(public_key
        .verify_simple(SIGNING_CONTEXT, payload, &signature)
        .is_ok())
}
