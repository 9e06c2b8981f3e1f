//! Secure Locker - Configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::KdfParams;
use crate::error::{LockerError, LockerResult};
use crate::DB_NAME;

/// Locker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockerConfig {
    /// Directory holding the database
    pub data_dir: PathBuf,
    /// Database file name inside `data_dir`
    pub db_name: String,
    /// Argon2id parameters for newly encrypted files
    pub kdf: KdfParams,
    /// Largest accepted upload in bytes
    pub max_file_size: u64,
}

impl Default for LockerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_name: DB_NAME.into(),
            kdf: KdfParams::default(),
            max_file_size: 256 * 1024 * 1024,
        }
    }
}

impl LockerConfig {
    /// Defaults rooted at `data_dir`
    pub fn at<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> LockerResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: LockerConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> LockerResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Full path of the database file
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_name)
    }

    pub fn validate(&self) -> LockerResult<()> {
        if self.db_name.trim().is_empty() {
            return Err(LockerError::Config("db_name must not be empty".into()));
        }
        if self.max_file_size == 0 {
            return Err(LockerError::Config("max_file_size must be positive".into()));
        }
        self.kdf
            .validate()
            .map_err(|e| LockerError::Config(e.to_string()))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("secure-locker")
}
