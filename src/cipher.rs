//! Secure Locker - PIN Cipher
//!
//! Turns bytes plus a PIN into one self-describing base64 token and back.
//!
//! Token layout before base64:
//!
//! ```text
//! ┌───────┬─────────┬────────┬────────┬──────┬───────┬─────────────────────┐
//! │ LKR1  │ mem KiB │ passes │ lanes  │ salt │ nonce │ AES-256-GCM(frame)  │
//! │ 4 B   │ u32 BE  │ u32 BE │ u32 BE │ 16 B │ 12 B  │ frame + 16 B tag    │
//! └───────┴─────────┴────────┴────────┴──────┴───────┴─────────────────────┘
//! ```
//!
//! Everything before the ciphertext is authenticated as associated data, and
//! the plaintext frame is the word block produced by [`crate::codec`].

use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroizing;

use crate::codec::{bytes_to_words, words_to_bytes, WordBlock};
use crate::crypto::{
    decrypt_aes_gcm, derive_file_key, encrypt_with_nonce, generate_nonce, generate_salt,
    EncryptedData, KdfParams, NONCE_LEN, SALT_LEN, TAG_LEN,
};
use crate::error::{LockerError, LockerResult};

/// Token magic and format version
pub const TOKEN_MAGIC: &[u8; 4] = b"LKR1";

/// Bytes before the ciphertext
pub const HEADER_LEN: usize = 4 + 4 * 3 + SALT_LEN + NONCE_LEN;

/// Smallest valid decoded token: header, empty frame, tag
const MIN_TOKEN_LEN: usize = HEADER_LEN + 8 + TAG_LEN;

/// Passphrase-keyed cipher
#[derive(Debug, Clone, Default)]
pub struct PinCipher {
    params: KdfParams,
}

impl PinCipher {
    /// Cipher that derives new keys with `params`
    pub fn new(params: KdfParams) -> LockerResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Parameters used for new tokens
    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Encrypt `bytes` under `pin`
    pub fn encrypt(&self, bytes: &[u8], pin: &str) -> LockerResult<String> {
        require_pin(pin)?;

        let block = bytes_to_words(bytes);
        let frame = block.to_frame();

        let salt = generate_salt();
        let nonce = generate_nonce();
        let header = encode_header(&self.params, &salt, &nonce);

        let key = derive_file_key(pin, &salt, &self.params)?;
        let sealed = encrypt_with_nonce(&key, nonce, &frame, &header)?;

        let mut token = Vec::with_capacity(HEADER_LEN + sealed.ciphertext.len());
        token.extend_from_slice(&header);
        token.extend_from_slice(&sealed.ciphertext);

        Ok(STANDARD.encode(token))
    }

    /// Decrypt a token produced by [`PinCipher::encrypt`]
    ///
    /// KDF parameters come from the token, not from `self`, so records sealed
    /// under older settings stay readable.
    pub fn decrypt(&self, token: &str, pin: &str) -> LockerResult<Zeroizing<Vec<u8>>> {
        require_pin(pin)?;

        let raw = STANDARD
            .decode(token.trim())
            .map_err(|e| LockerError::Decryption(format!("malformed token encoding: {}", e)))?;

        if raw.len() < MIN_TOKEN_LEN {
            return Err(LockerError::Decryption("token too short".into()));
        }

        let (header, ciphertext) = raw.split_at(HEADER_LEN);
        let parsed = decode_header(header)?;

        let key = derive_file_key(pin, &parsed.salt, &parsed.params)?;
        let encrypted = EncryptedData {
            nonce: parsed.nonce,
            ciphertext: ciphertext.to_vec(),
        };
        let frame = decrypt_aes_gcm(&key, &encrypted, header)?;

        let block = WordBlock::from_frame(&frame)?;
        Ok(Zeroizing::new(words_to_bytes(&block)))
    }
}

fn require_pin(pin: &str) -> LockerResult<()> {
    if pin.is_empty() {
        return Err(LockerError::Precondition("PIN required".into()));
    }
    Ok(())
}

struct TokenHeader {
    params: KdfParams,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
}

fn encode_header(
    params: &KdfParams,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(TOKEN_MAGIC);
    header[4..8].copy_from_slice(&params.memory_kib.to_be_bytes());
    header[8..12].copy_from_slice(&params.iterations.to_be_bytes());
    header[12..16].copy_from_slice(&params.parallelism.to_be_bytes());
    header[16..16 + SALT_LEN].copy_from_slice(salt);
    header[16 + SALT_LEN..].copy_from_slice(nonce);
    header
}

fn decode_header(header: &[u8]) -> LockerResult<TokenHeader> {
    if header.len() != HEADER_LEN || &header[0..4] != TOKEN_MAGIC {
        return Err(LockerError::Decryption("unrecognised token format".into()));
    }

    let read_u32 = |at: usize| {
        u32::from_be_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]])
    };
    let params = KdfParams {
        memory_kib: read_u32(4),
        iterations: read_u32(8),
        parallelism: read_u32(12),
    };
    params
        .validate()
        .map_err(|_| LockerError::Decryption("implausible key derivation parameters".into()))?;

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&header[16..16 + SALT_LEN]);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&header[16 + SALT_LEN..]);

    Ok(TokenHeader { params, salt, nonce })
}
