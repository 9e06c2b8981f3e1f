//! Secure Locker - Main Locker Implementation
//!
//! Composes the cipher and the file store into upload / list / open /
//! download / remove. The PIN is an argument to every call that needs it and
//! is never kept.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::cipher::PinCipher;
use crate::config::LockerConfig;
use crate::error::{LockerError, LockerResult};
use crate::mime::{self, PreviewKind};
use crate::secure_fs;
use crate::store::{FileRecord, FileStore};

/// Listing entry; carries no ciphertext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl From<FileRecord> for FileEntry {
    fn from(record: FileRecord) -> Self {
        Self {
            filename: record.filename,
            mime_type: record.mime_type,
        }
    }
}

/// Decrypted file handed to the caller
///
/// The plaintext buffer is wiped when this value is dropped.
pub struct DecryptedFile {
    filename: String,
    mime_type: String,
    bytes: Zeroizing<Vec<u8>>,
}

impl DecryptedFile {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Inline image/video preview, or external
    pub fn preview_kind(&self) -> PreviewKind {
        PreviewKind::for_mime(&self.mime_type)
    }

    /// Take the buffer; it is still wiped when the caller drops it
    pub fn into_bytes(self) -> Zeroizing<Vec<u8>> {
        self.bytes
    }

    /// Write the plaintext to `dir/<filename>` atomically
    pub fn save_to(&self, dir: &Path) -> LockerResult<PathBuf> {
        secure_fs::write_atomic(dir, &self.filename, &self.bytes)
    }
}

impl std::fmt::Debug for DecryptedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptedFile")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Secure Locker - Main entry point
pub struct Locker {
    config: LockerConfig,
    cipher: PinCipher,
    store: FileStore,
}

impl Locker {
    /// Open (or create) the locker described by `config`
    pub fn new(config: LockerConfig) -> LockerResult<Self> {
        config.validate()?;

        let cipher = PinCipher::new(config.kdf)?;
        let store = FileStore::open(&config.db_path())?;

        let params = cipher.params();
        log::info!(
            "Locker ready at {} ({} files, argon2id m={} t={} p={})",
            store.path().display(),
            store.count()?,
            params.memory_kib,
            params.iterations,
            params.parallelism
        );

        Ok(Self {
            config,
            cipher,
            store,
        })
    }

    /// Open the locker in `data_dir` with default settings
    pub fn open_dir<P: AsRef<Path>>(data_dir: P) -> LockerResult<Self> {
        Self::new(LockerConfig::at(data_dir))
    }

    pub fn config(&self) -> &LockerConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════
    // FILE OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Encrypt `data` with `pin` and store it under `filename`
    ///
    /// Re-uploading an existing name overwrites it. A missing `mime_type` is
    /// sniffed from the content.
    pub fn upload(
        &self,
        filename: &str,
        data: &[u8],
        mime_type: Option<&str>,
        pin: &str,
    ) -> LockerResult<FileEntry> {
        if filename.trim().is_empty() {
            return Err(LockerError::Precondition("file name required".into()));
        }
        if pin.is_empty() {
            return Err(LockerError::Precondition("PIN required".into()));
        }

        let size = data.len() as u64;
        if size > self.config.max_file_size {
            return Err(LockerError::FileTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }

        let record = FileRecord {
            filename: filename.to_string(),
            encrypted_data: self.cipher.encrypt(data, pin)?,
            mime_type: mime::resolve(mime_type, data),
        };
        self.store.put(&record)?;

        log::info!("Stored {} ({} bytes, {})", record.filename, size, record.mime_type);

        Ok(record.into())
    }

    /// Read a file from disk and upload it under its own file name
    pub fn upload_path(&self, path: &Path, pin: &str) -> LockerResult<FileEntry> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                LockerError::Precondition(format!("no file name in {}", path.display()))
            })?
            .to_string();

        let metadata = std::fs::metadata(path)?;
        if metadata.len() > self.config.max_file_size {
            return Err(LockerError::FileTooLarge {
                size: metadata.len(),
                max: self.config.max_file_size,
            });
        }

        let data = Zeroizing::new(std::fs::read(path)?);
        self.upload(&filename, &data, None, pin)
    }

    /// Names and MIME types of everything stored
    pub fn list(&self) -> LockerResult<Vec<FileEntry>> {
        Ok(self
            .store
            .get_all()?
            .into_iter()
            .map(FileEntry::from)
            .collect())
    }

    /// Decrypt `filename` for viewing
    pub fn open(&self, filename: &str, pin: &str) -> LockerResult<DecryptedFile> {
        self.decrypt_record(filename, pin)
    }

    /// Decrypt `filename` for saving
    pub fn download(&self, filename: &str, pin: &str) -> LockerResult<DecryptedFile> {
        self.decrypt_record(filename, pin)
    }

    /// Decrypt `filename` and write it into `dest_dir`
    pub fn download_to(
        &self,
        filename: &str,
        pin: &str,
        dest_dir: &Path,
    ) -> LockerResult<PathBuf> {
        let file = self.download(filename, pin)?;
        let path = file.save_to(dest_dir)?;
        log::info!("Exported {} to {}", filename, path.display());
        Ok(path)
    }

    /// Delete `filename`; removing a missing name succeeds
    pub fn remove(&self, filename: &str) -> LockerResult<()> {
        if self.store.delete(filename)? {
            log::info!("Removed {}", filename);
        } else {
            log::debug!("Nothing stored under {}", filename);
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    fn decrypt_record(&self, filename: &str, pin: &str) -> LockerResult<DecryptedFile> {
        if pin.is_empty() {
            return Err(LockerError::Precondition("PIN required".into()));
        }

        let record = self
            .store
            .get(filename)?
            .ok_or_else(|| LockerError::NotFound(filename.to_string()))?;

        let bytes = self.cipher.decrypt(&record.encrypted_data, pin).map_err(|e| {
            log::warn!("Could not decrypt {}: {}", filename, e);
            e
        })?;

        log::debug!("Decrypted {} ({} bytes)", filename, bytes.len());

        Ok(DecryptedFile {
            filename: record.filename,
            mime_type: record.mime_type,
            bytes,
        })
    }
}
