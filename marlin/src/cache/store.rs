//! On-disk persistence of the metadata snapshot.
//!
//! Writes are atomic: the document goes to `<path>.tmp` first and is renamed
//! into place once flushed.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use marlin_core::{ExchangeList, MarlinError};

/// JSON file holding one [`ExchangeList`].
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Read the snapshot, or `None` if no file exists.
    ///
    /// A parent path that is not a directory also means no snapshot exists.
    ///
    /// # Errors
    /// Returns `SnapshotCorrupt` if the file exists but cannot be read or decoded.
    pub fn load(&self) -> Result<Option<ExchangeList>, MarlinError> {
        let corrupt = |msg: String| MarlinError::SnapshotCorrupt {
            path: self.path.display().to_string(),
            msg,
        };
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Ok(None);
            }
            Err(e) => return Err(corrupt(format!("read: {e}"))),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| corrupt(format!("decode: {e}")))
    }

    /// Replace the snapshot with `list`, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns `Io` if any filesystem step fails; the previous file is left intact.
    pub fn save(&self, list: &ExchangeList) -> Result<(), MarlinError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| MarlinError::io(dir, &e))?;
        }

        let tmp = self.tmp_path();
        let write = || -> std::io::Result<()> {
            let mut out = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut out, list)?;
            out.flush()?;
            out.get_ref().sync_all()
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(MarlinError::io(&tmp, &e));
        }

        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            MarlinError::io(&self.path, &e)
        })
    }
}
