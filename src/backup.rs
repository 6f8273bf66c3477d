//! Backup + commit для перезаписи .RPL.
//!
//! Порядок:
//! 1) исходный файл переименовывается в `<name>.<suffix>` (старый бэкап перезаписывается);
//! 2) новый контент пишется по исходному пути (create/truncate/write + fsync).
//!
//! Падение между 1) и 2) оставляет оригинал в бэкапе; частично записанного
//! файла на месте оригинала быть не может, пока rename не прошёл.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};

/// `/a/b/kit.RPL` + `bak` -> `/a/b/kit.RPL.bak`.
pub fn backup_path(path: &Path, suffix: &str) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| anyhow!("not a file path: {}", path.display()))?;
    let mut bak: OsString = name.to_os_string();
    bak.push(".");
    bak.push(suffix);
    Ok(path.with_file_name(bak))
}

/// Rename the original aside, then write `bytes` in its place. Returns the backup path.
pub fn commit_with_backup(path: &Path, bytes: &[u8], suffix: &str) -> Result<PathBuf> {
    let bak = backup_path(path, suffix)?;
    if bak.exists() {
        warn!("backup: overwriting previous backup {}", bak.display());
    }

    fs::rename(path, &bak)
        .with_context(|| format!("rename {} -> {}", path.display(), bak.display()))?;

    let mut f = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .with_context(|| format!("open {} for write", path.display()))?;
    f.write_all(bytes)
        .with_context(|| format!("write {}", path.display()))?;
    f.sync_all()?;

    info!(
        "backup: original saved to {}, wrote {} B to {}",
        bak.display(),
        bytes.len(),
        path.display()
    );
    Ok(bak)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_name_appends_suffix() -> Result<()> {
        let p = Path::new("/tmp/x/20251207.RPL");
        assert_eq!(backup_path(p, "bak")?, PathBuf::from("/tmp/x/20251207.RPL.bak"));
        assert!(backup_path(Path::new("/"), "bak").is_err());
        Ok(())
    }

    #[test]
    fn missing_original_fails_before_any_write() {
        let dir = std::env::temp_dir().join(format!("rplbak-missing-{}", std::process::id()));
        let path = dir.join("absent").join("kit.RPL");
        let err = commit_with_backup(&path, b"new", "bak").unwrap_err();
        assert!(format!("{:#}", err).contains("rename"));
        assert!(!path.exists());
    }
}
