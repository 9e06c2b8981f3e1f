//! Secure Locker - Cryptographic Core
//!
//! Argon2id turns a PIN into key material, HKDF narrows it to a file key,
//! AES-256-GCM seals the payload.

pub mod keys;
pub mod kdf;
pub mod aead;

pub use keys::*;
pub use kdf::*;
pub use aead::*;
