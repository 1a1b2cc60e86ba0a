use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory missing or not writable: {0}")]
    DownloadDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the download directory exists; create if missing.
pub fn ensure_download_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::DownloadDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::DownloadDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::DownloadDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::DownloadDir(e.to_string()))?;
    Ok(())
}

/// Atomically write an exported document to `{dir}/{filename}` by
/// writing a temp file then renaming. Re-downloading the same format
/// replaces the previous file.
pub struct DocumentWriter {
    dir: PathBuf,
}

impl DocumentWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_download_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_the_directory_and_replaces_existing_files() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = root.path().join("downloads");
        let writer = DocumentWriter::new(dir.clone());

        let first = writer
            .write("optimized_resume.pdf", b"%PDF-1.4 first")
            .expect("first write");
        assert_eq!(first, dir.join("optimized_resume.pdf"));

        let second = writer
            .write("optimized_resume.pdf", b"%PDF-1.4 second")
            .expect("second write");
        assert_eq!(second, first);
        let stored = fs::read(&second).expect("read back");
        assert_eq!(stored, b"%PDF-1.4 second");
    }

    #[test]
    fn files_are_rejected_when_the_directory_path_is_a_file() {
        let root = tempfile::tempdir().expect("tempdir");
        let not_a_dir = root.path().join("downloads");
        fs::write(&not_a_dir, b"occupied").expect("occupy path");

        let err = ensure_download_dir(&not_a_dir).expect_err("must fail");
        assert!(matches!(err, PersistError::DownloadDir(_)));
    }
}
