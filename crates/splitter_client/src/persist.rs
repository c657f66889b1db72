use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory missing or not writable: {0}")]
    TargetDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the download directory exists; create it if missing.
pub fn ensure_target_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::TargetDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::TargetDir("path is not a directory".into()));
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| PersistError::TargetDir(e.to_string()))
}

/// Writes downloaded artifacts into one directory, never leaving partial files.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let dir = dir.into();
        ensure_target_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to `{dir}/{file_name}` through a temp file and rename.
    pub fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        let target = self.dir.join(file_name);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // A previous download of the same artifact is replaced.
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
