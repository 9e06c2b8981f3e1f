//! Argon2id KDF for turning a PIN into key material

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::keys::{contexts, derive_key, LockerKey, KEY_LEN};
use crate::error::{LockerError, LockerResult};

/// Upper bound on memory accepted from a stored token (1 GiB)
pub const MAX_MEMORY_KIB: u32 = 1024 * 1024;

/// Upper bound on passes accepted from a stored token
pub const MAX_ITERATIONS: u32 = 64;

/// Upper bound on lanes accepted from a stored token
pub const MAX_PARALLELISM: u32 = 16;

/// Argon2id parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory in KiB
    pub memory_kib: u32,
    /// Passes (time cost)
    pub iterations: u32,
    /// Lanes
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024, // 64 MiB
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Preset for weak devices
    pub fn low_memory() -> Self {
        Self {
            memory_kib: 16 * 1024, // 16 MiB
            iterations: 4,
            parallelism: 1,
        }
    }

    /// Check the parameters are usable and within the accepted bounds
    pub fn validate(&self) -> LockerResult<()> {
        if self.parallelism == 0 || self.parallelism > MAX_PARALLELISM {
            return Err(LockerError::KeyDerivationFailed(format!(
                "parallelism {} out of range 1..={}",
                self.parallelism, MAX_PARALLELISM
            )));
        }
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(LockerError::KeyDerivationFailed(format!(
                "iterations {} out of range 1..={}",
                self.iterations, MAX_ITERATIONS
            )));
        }
        if self.memory_kib < 8 * self.parallelism || self.memory_kib > MAX_MEMORY_KIB {
            return Err(LockerError::KeyDerivationFailed(format!(
                "memory {} KiB out of range {}..={}",
                self.memory_kib,
                8 * self.parallelism,
                MAX_MEMORY_KIB
            )));
        }
        Ok(())
    }

    fn to_argon2(self) -> LockerResult<Argon2<'static>> {
        self.validate()?;
        let params = Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| LockerError::KeyDerivationFailed(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Derive the file key for `pin` and `salt`
///
/// Argon2id stretches the PIN, HKDF-SHA256 binds the result to the file-key
/// context. Same inputs always give the same key.
pub fn derive_file_key(pin: &str, salt: &[u8], params: &KdfParams) -> LockerResult<LockerKey> {
    let argon2 = params.to_argon2()?;

    let mut stretched = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(pin.as_bytes(), salt, &mut stretched[..])
        .map_err(|e| LockerError::KeyDerivationFailed(e.to_string()))?;

    derive_key(&stretched[..], salt, contexts::FILE_KEY)
}
