//! Temp-file lifecycle for asset transfers.
//!
//! Bytes land in `<final>.part` and are renamed onto the final path only once
//! the transfer is known to be complete. A `PartFile` dropped without
//! `finalize` removes its temp file, so a failed transfer never leaves an
//! artifact that looks like a finished download.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Write buffer size; the body is flushed to disk in chunks of this size.
const BUF_SIZE: usize = 64 * 1024;

/// Path for the temp file: appends `.part` to the final path (e.g. `a.jpg` → `a.jpg.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Temp file that becomes `final_path` on `finalize`.
pub struct PartFile {
    writer: Option<BufWriter<File>>,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl PartFile {
    /// Create (or truncate) the temp file for `final_path`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::create(&temp_path)?;
        Ok(Self {
            writer: Some(BufWriter::with_capacity(BUF_SIZE, file)),
            temp_path,
            final_path: final_path.to_path_buf(),
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, close and rename onto the final path, replacing any existing file.
    /// On failure the temp file is removed.
    pub fn finalize(mut self) -> io::Result<PathBuf> {
        let Some(writer) = self.writer.take() else {
            return Err(io::Error::new(io::ErrorKind::Other, "part file already closed"));
        };
        let res = writer
            .into_inner()
            .map_err(|e| e.into_error())
            .and_then(|file| file.sync_all())
            .and_then(|()| fs::rename(&self.temp_path, &self.final_path));
        if let Err(e) = res {
            let _ = fs::remove_file(&self.temp_path);
            return Err(e);
        }
        Ok(self.final_path.clone())
    }
}

impl Write for PartFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.writer.as_mut() {
            Some(w) => w.write(buf),
            None => Err(io::Error::new(io::ErrorKind::Other, "part file already closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        // Still holding the writer means finalize never ran.
        if self.writer.take().is_some() {
            if let Err(e) = fs::remove_file(&self.temp_path) {
                tracing::debug!("could not remove {}: {}", self.temp_path.display(), e);
            }
        }
    }
}
