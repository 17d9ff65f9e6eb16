// SPDX-License-Identifier: PMPL-1.0-or-later

//! File helpers for source, target and backup blobs

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Read a whole UTF-8 file.
pub fn read_blob(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    String::from_utf8(bytes).map_err(|e| {
        anyhow!(
            "{} is not valid UTF-8 (first bad byte at offset {})",
            path.display(),
            e.utf8_error().valid_up_to()
        )
    })
}

/// Overwrite `path` with `content`, creating parent directories as needed.
pub fn write_blob(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}

/// Copy `path` to `<path>.<YYYYmmddHHMMSS>.bak` next to it.
///
/// Returns `None` when there is nothing to back up yet.
pub fn backup(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("cannot back up {}: no file name", path.display()))?;

    let mut dest = path.with_file_name(format!("{}.{}.bak", file_name, timestamp));
    let mut n = 1;
    while dest.exists() {
        dest = path.with_file_name(format!("{}.{}-{}.bak", file_name, timestamp, n));
        n += 1;
    }

    fs::copy(path, &dest)
        .with_context(|| format!("backing up {} to {}", path.display(), dest.display()))?;
    Ok(Some(dest))
}

/// Hex SHA-256 of a blob, used to tell whether a run changed anything.
pub fn digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.js");
        let err = read_blob(&missing).unwrap_err();
        assert!(format!("{:#}", err).contains("nope.js"));
    }

    #[test]
    fn test_read_rejects_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, [b'o', b'k', 0xff, 0xfe]).unwrap();
        let err = read_blob(&path).unwrap_err();
        assert!(err.to_string().contains("offset 2"), "got: {}", err);
    }

    #[test]
    fn test_backup_preserves_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zh.js");
        fs::write(&path, "original").unwrap();

        let first = backup(&path).unwrap().expect("file exists");
        let second = backup(&path).unwrap().expect("file exists");
        assert_ne!(first, second, "backups must not overwrite each other");
        assert_eq!(fs::read_to_string(&first).unwrap(), "original");
        assert!(first.to_string_lossy().ends_with(".bak"));
    }

    #[test]
    fn test_backup_of_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(backup(&dir.path().join("new.js")).unwrap(), None);
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(digest("abc"), digest("abc"));
        assert_ne!(digest("abc"), digest("abd"));
        assert_eq!(digest("").len(), 64);
    }
}
