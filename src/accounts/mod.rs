//! Account support
//!
//! Substrate (sr25519) accounts: creation from a fresh mnemonic, import from a
//! mnemonic or a raw mini-secret, SS58 addressing, message signing and
//! sealed-box encryption.

mod encryption;
mod mnemonic;
pub mod ss58;
mod substrate;

pub use mnemonic::{generate_mnemonic, mnemonic_to_mini_secret};
pub use substrate::{
    import_account_from_mnemonic, import_account_from_private_key, new_account, verify_signature,
    SubstrateAccount,
};

use thiserror::Error;

use crate::messages::{BaseMessage, Chain};

/// Account errors
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),
}

/// Behaviour shared by every account handle
pub trait Account: Send + Sync {
    /// Chain-specific address of the account
    fn address(&self) -> &str;

    /// Chain the account belongs to
    fn chain(&self) -> Chain;

    /// Raw public key bytes
    fn public_key(&self) -> Vec<u8>;

    /// Sign an arbitrary payload, returning the chain's signature encoding
    fn sign(&self, payload: &[u8]) -> Result<String, AccountError>;

    /// Sign the verification buffer of a message
    fn sign_message(&self, message: &BaseMessage) -> Result<String, AccountError> {
        self.sign(message.verification_buffer().as_bytes())
    }

    /// Encrypt content so that only this account can read it back
    fn encrypt(&self, content: &[u8]) -> Result<Vec<u8>, AccountError>;

    /// Decrypt content produced by [`Account::encrypt`]
    fn decrypt(&self, content: &[u8]) -> Result<Vec<u8>, AccountError>;
}
