//! Account key material: signing and the encrypted-key file envelope.

use crate::types::Address;
use ed25519_dalek::{Signer, SigningKey, SECRET_KEY_LENGTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// On-disk envelope format version.
pub const KEYSTORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("ed25519: bad private key length: {0}")]
    BadSecretLength(usize),
    #[error("keystore envelope error: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("no key stored for address {0}")]
    NoSuchKey(Address),
    #[error("wrong password for address {0}")]
    WrongPassword(Address),
}

/// Password-protected key access, backed by encrypted files on disk.
pub trait KeyStore {
    /// Recover the key for `address` using `password`.
    fn extract_key(&self, address: Address, password: &str) -> Result<Key, KeyStoreError>;

    fn store_key(&self, key: &Key, password: &str) -> Result<(), KeyStoreError>;
}

/// A decrypted account key held in memory.
#[derive(Debug)]
pub struct Key {
    pub id: Uuid,
    pub address: Address,
    signing_key: SigningKey,
}

impl Key {
    /// Build a key from raw secret bytes, validating the length.
    pub fn from_secret(id: Uuid, address: Address, secret: &[u8]) -> Result<Key, KeyStoreError> {
        let secret: [u8; SECRET_KEY_LENGTH] = secret
            .try_into()
            .map_err(|_| KeyStoreError::BadSecretLength(secret.len()))?;
        Ok(Key {
            id,
            address,
            signing_key: SigningKey::from_bytes(&secret),
        })
    }

    pub fn sign(&self, data: &[u8]) -> [u8; 64] {
        self.signing_key.sign(data).to_bytes()
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

/// Serialized form of one encrypted key file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedKeyJson {
    pub address: String,
    pub crypto: CryptoJson,
    pub id: String,
    pub version: u32,
}

/// Cipher parameters inside the envelope. `kdfparams` stays schemaless so
/// different KDFs can carry their own parameter sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoJson {
    pub cipher: String,
    #[serde(rename = "ciphertext")]
    pub cipher_text: String,
    pub nonce: String,
    pub kdf: String,
    #[serde(rename = "kdfparams")]
    pub kdf_params: serde_json::Value,
}

impl EncryptedKeyJson {
    pub fn to_json(&self) -> Result<String, KeyStoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<EncryptedKeyJson, KeyStoreError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ADDRESS_SIZE;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    fn address() -> Address {
        Address::from_bytes([5; ADDRESS_SIZE])
    }

    #[test]
    fn rejects_bad_secret_length() {
        let err = Key::from_secret(Uuid::nil(), address(), &[0u8; 31]).unwrap_err();
        assert!(matches!(err, KeyStoreError::BadSecretLength(31)));
    }

    #[test]
    fn signatures_verify() {
        let key = Key::from_secret(Uuid::nil(), address(), &[7u8; 32]).unwrap();
        let signature = key.sign(b"hello");
        let verifying = VerifyingKey::from_bytes(&key.public_key()).unwrap();
        assert!(verifying
            .verify(b"hello", &Signature::from_bytes(&signature))
            .is_ok());
    }

    #[test]
    fn envelope_round_trips() {
        let envelope = EncryptedKeyJson {
            address: address().to_string(),
            crypto: CryptoJson {
                cipher: "aes-256-gcm".into(),
                cipher_text: "deadbeef".into(),
                nonce: "0102".into(),
                kdf: "scrypt".into(),
                kdf_params: serde_json::json!({"n": 4096, "r": 8, "p": 6}),
            },
            id: Uuid::nil().to_string(),
            version: KEYSTORE_VERSION,
        };
        let text = envelope.to_json().unwrap();
        // Field names follow the on-disk format, not Rust casing.
        assert!(text.contains("\"ciphertext\""));
        assert!(text.contains("\"kdfparams\""));
        let back = EncryptedKeyJson::from_json(&text).unwrap();
        assert_eq!(back.version, KEYSTORE_VERSION);
        assert_eq!(back.crypto.kdf, "scrypt");
    }
}
