//! Secure Locker - Filesystem helpers for exported plaintext

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{LockerError, LockerResult};

/// Plain file-name component of `name`, or `None` for things like `..` or `a/`
pub fn safe_file_name(name: &str) -> Option<&str> {
    if name.contains(|c: char| c == '/' || c == '\\') {
        return None;
    }
    let file_name = Path::new(name).file_name()?.to_str()?;
    (file_name == name).then_some(file_name)
}

/// Write `data` to `dir/name` atomically (temp file, fsync, rename)
pub fn write_atomic(dir: &Path, name: &str, data: &[u8]) -> LockerResult<PathBuf> {
    let file_name = safe_file_name(name)
        .ok_or_else(|| LockerError::Precondition(format!("unusable file name: {:?}", name)))?;

    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let temp_path = dir.join(format!(".{}.tmp", file_name));

    let result = (|| -> LockerResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result?;

    Ok(path)
}
