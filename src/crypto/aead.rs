//! Secure Locker - AEAD Encryption
//!
//! AES-256-GCM with associated data.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use zeroize::Zeroizing;

use super::keys::{LockerKey, NONCE_LEN};
use crate::error::{LockerError, LockerResult};

/// GCM authentication tag length
pub const TAG_LEN: usize = 16;

/// Ciphertext together with the nonce it was sealed under
pub struct EncryptedData {
    /// 12-byte GCM nonce
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with authentication tag
    pub ciphertext: Vec<u8>,
}

/// Encrypt data with AES-256-GCM under a fresh random nonce
#[cfg(test)]
pub(crate) fn encrypt_aes_gcm(
    key: &LockerKey,
    plaintext: &[u8],
    aad: &[u8],
) -> LockerResult<EncryptedData> {
    encrypt_with_nonce(key, super::keys::generate_nonce(), plaintext, aad)
}

/// Encrypt under a caller-chosen nonce (never reuse one with the same key)
pub fn encrypt_with_nonce(
    key: &LockerKey,
    nonce: [u8; NONCE_LEN],
    plaintext: &[u8],
    aad: &[u8],
) -> LockerResult<EncryptedData> {
    let cipher = Aes256Gcm::new_from_slice(key.expose())
        .map_err(|e| LockerError::EncryptionFailed(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), Payload { msg: plaintext, aad })
        .map_err(|e| LockerError::EncryptionFailed(e.to_string()))?;

    Ok(EncryptedData { nonce, ciphertext })
}

/// Decrypt data with AES-256-GCM
///
/// Any tag mismatch (wrong key, altered ciphertext, altered `aad`) is a
/// `Decryption` error.
pub fn decrypt_aes_gcm(
    key: &LockerKey,
    encrypted: &EncryptedData,
    aad: &[u8],
) -> LockerResult<Zeroizing<Vec<u8>>> {
    if encrypted.ciphertext.len() < TAG_LEN {
        return Err(LockerError::Decryption("ciphertext too short".into()));
    }

    let cipher = Aes256Gcm::new_from_slice(key.expose())
        .map_err(|e| LockerError::Decryption(e.to_string()))?;

    cipher
        .decrypt(
            Nonce::from_slice(&encrypted.nonce),
            Payload {
                msg: encrypted.ciphertext.as_slice(),
                aad,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| LockerError::Decryption("authentication failed".into()))
}
