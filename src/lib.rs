//! # Secure Locker
//!
//! PIN-encrypted local file storage.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     SECURE LOCKER                        │
//! │   upload / list / open / download / remove               │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────┐  │
//! │  │  WORD CODEC │→ │ PIN CIPHER  │→ │  FILE STORE     │  │
//! │  │  bytes⇄u32  │  │ Argon2id +  │  │  SQLite         │  │
//! │  │             │  │ AES-256-GCM │  │  SecureVault.db │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Model
//!
//! - Every file encrypted under a key derived from the PIN and a per-file salt
//! - Tokens are authenticated; a wrong PIN or a tampered record is an error
//! - The PIN is never stored, it is passed into each call
//! - Decrypted buffers are zeroized when dropped

pub mod cipher;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod locker;
pub mod mime;
pub mod secure_fs;
pub mod store;

pub use cipher::PinCipher;
pub use codec::{bytes_to_words, words_to_bytes, WordBlock};
pub use config::LockerConfig;
pub use crypto::KdfParams;
pub use error::{LockerError, LockerResult};
pub use locker::{DecryptedFile, FileEntry, Locker};
pub use mime::PreviewKind;
pub use store::{FileRecord, FileStore};

/// Secure Locker version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the locker database file
pub const DB_NAME: &str = "SecureVault.db";

/// Schema version written on first run
pub const SCHEMA_VERSION: u32 = 1;

/// MIME type used when nothing better is known
pub const DEFAULT_MIME: &str = "application/octet-stream";
