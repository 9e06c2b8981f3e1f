//! Secure Locker - Error Types

use thiserror::Error;

/// Result type for locker operations
pub type LockerResult<T> = Result<T, LockerError>;

/// Locker error types
#[derive(Error, Debug)]
pub enum LockerError {
    // ═══════════════════════════════════════════════════════════════
    // CALLER ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File too large: {size} bytes (max: {max})")]
    FileTooLarge { size: u64, max: u64 },

    // ═══════════════════════════════════════════════════════════════
    // CRYPTO ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Decryption failed (wrong PIN or corrupt data): {0}")]
    Decryption(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // ═══════════════════════════════════════════════════════════════
    // STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unsupported database schema version: expected {expected}, found {found}")]
    SchemaVersion { expected: u32, found: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════
    // CONFIG ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl LockerError {
    /// Wrong PIN or a damaged record
    pub fn is_security_critical(&self) -> bool {
        matches!(self, LockerError::Decryption(_))
    }

    /// Errors the caller can fix by changing its input
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            LockerError::Precondition(_)
                | LockerError::NotFound(_)
                | LockerError::FileTooLarge { .. }
        )
    }
}

impl From<rusqlite::Error> for LockerError {
    fn from(e: rusqlite::Error) -> Self {
        LockerError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for LockerError {
    fn from(e: serde_json::Error) -> Self {
        LockerError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        let errors = [
            LockerError::Precondition("PIN required".into()),
            LockerError::NotFound("a.txt".into()),
            LockerError::Decryption("authentication failed".into()),
        ];

        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(messages[0].starts_with("Precondition failed"));
        assert!(messages[1].starts_with("File not found"));
        assert!(messages[2].contains("wrong PIN or corrupt data"));
    }

    #[test]
    fn test_classification() {
        assert!(LockerError::Decryption("x".into()).is_security_critical());
        assert!(!LockerError::Decryption("x".into()).is_caller_error());
        assert!(LockerError::NotFound("x".into()).is_caller_error());
        assert!(LockerError::FileTooLarge { size: 2, max: 1 }.is_caller_error());
        assert!(!LockerError::Database("x".into()).is_caller_error());
    }
}
