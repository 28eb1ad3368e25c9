//! JSON keyset file used by the CLI to keep derived keys between runs.

use anyhow::{Context, Result};
use getrandom::fill;
use krbcrypt::Keyset;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// A keyset persisted as JSON at `path`.
#[derive(Debug, Clone)]
pub struct KeysetFile {
    path: PathBuf,
}

impl KeysetFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the keyset. A missing file is an empty keyset.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or is not a valid keyset.
    pub fn load(&self) -> Result<Keyset> {
        if !self.exists() {
            return Ok(Keyset::default());
        }
        let data = Zeroizing::new(
            fs::read(&self.path)
                .with_context(|| format!("failed to read keyset {}", self.path.display()))?,
        );
        serde_json::from_slice(&data)
            .with_context(|| format!("malformed keyset file {}", self.path.display()))
    }

    /// Writes the keyset through a temporary file and an atomic rename, so
    /// a crash leaves either the old or the new file in place.
    ///
    /// # Errors
    ///
    /// Fails if the parent directory cannot be created, or if writing, syncing
    /// or renaming the temporary file fails. The temporary file is removed
    /// before returning.
    pub fn save(&self, keyset: &Keyset) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = Zeroizing::new(serde_json::to_vec_pretty(keyset)?);
        let tmp_path = self.random_tmp_path()?;

        let mut tmp_file = open_private(&tmp_path).context("failed to create temporary file")?;
        let written = tmp_file
            .write_all(&data)
            .and_then(|()| tmp_file.sync_all())
            .context("failed to write temporary file");
        drop(tmp_file);

        if let Err(e) = written.and_then(|()| {
            fs::rename(&tmp_path, &self.path).context("atomic replace failed")
        }) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            File::open(parent)?.sync_all()?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<name>.tmp.<16 hex digits>` next to the target.
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        fill(&mut buf)?;
        let file_name = self
            .path
            .file_name()
            .context("keyset path has no file name")?
            .to_string_lossy();
        Ok(self
            .path
            .with_file_name(format!("{file_name}.tmp.{}", hex::encode(buf))))
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}
