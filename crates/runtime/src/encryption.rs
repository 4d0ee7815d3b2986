// Path: crates/runtime/src/encryption.rs
//! Opt-in envelope encryption for named state stores.
//!
//! AES-256-GCM with a random 12-byte nonce per write. The wire form is
//! `base64(nonce || ciphertext || tag)`, so drivers only ever observe
//! opaque text. Decryption of a round-tripped payload is byte-identical to
//! the submitted plaintext.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use thiserror::Error;

/// Size of the AES-GCM nonce in bytes.
const NONCE_SIZE: usize = 12;

/// Failures of the encryption gate.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// Encrypting the payload failed.
    #[error("failed to encrypt value: {0}")]
    Encrypt(String),
    /// The stored value is not valid ciphertext for this store's key.
    #[error("failed to decrypt value: {0}")]
    Decrypt(String),
}

/// The cipher for one encrypted state store.
pub struct StateEncryption {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for StateEncryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateEncryption").finish_non_exhaustive()
    }
}

impl StateEncryption {
    /// Creates the cipher from a 256-bit key.
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Transforms plaintext into the opaque wire form.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Bytes, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| EncryptionError::Encrypt(e.to_string()))?;

        let mut framed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&ciphertext);
        Ok(Bytes::from(BASE64.encode(framed).into_bytes()))
    }

    /// Recovers plaintext from the wire form.
    pub fn decrypt(&self, wire: &[u8]) -> Result<Bytes, EncryptionError> {
        let framed = BASE64
            .decode(wire)
            .map_err(|e| EncryptionError::Decrypt(format!("invalid base64: {e}")))?;
        if framed.len() < NONCE_SIZE {
            return Err(EncryptionError::Decrypt("value too short".to_string()));
        }
        let (nonce_bytes, ciphertext) = framed.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| EncryptionError::Decrypt(e.to_string()))?;
        Ok(Bytes::from(plaintext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> StateEncryption {
        StateEncryption::new(&[7u8; 32])
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let gate = gate();
        let plaintext = b"the exact original bytes \x00\x01\x02";
        let wire = gate.encrypt(plaintext).unwrap();
        assert_ne!(&wire[..], &plaintext[..]);
        let recovered = gate.decrypt(&wire).unwrap();
        assert_eq!(&recovered[..], &plaintext[..]);
    }

    #[test]
    fn nonces_differ_between_writes() {
        let gate = gate();
        let a = gate.encrypt(b"same").unwrap();
        let b = gate.encrypt(b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn corrupt_ciphertext_fails_decryption() {
        let gate = gate();
        let wire = gate.encrypt(b"payload").unwrap();
        let mut corrupted = BASE64.decode(&wire[..]).unwrap();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0xff;
        let corrupted_wire = BASE64.encode(corrupted);
        assert!(matches!(
            gate.decrypt(corrupted_wire.as_bytes()),
            Err(EncryptionError::Decrypt(_))
        ));
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let wire = gate().encrypt(b"payload").unwrap();
        let other = StateEncryption::new(&[8u8; 32]);
        assert!(other.decrypt(&wire).is_err());
    }
}
