//! Size-based log file rotation
//!
//! When a write would take the file to `max_bytes`, the current file
//! becomes `name.1`, `name.1` becomes `name.2`, and so on up to `backups`
//! files; the oldest is discarded and writing continues in a fresh file.

use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Shared handle to a rotating log file
#[derive(Debug, Clone)]
pub struct RotatingFileWriter {
    state: Arc<Mutex<RotatingFile>>,
}

#[derive(Debug)]
struct RotatingFile {
    path: PathBuf,
    file: File,
    size: u64,
    max_bytes: u64,
    backups: usize,
}

impl RotatingFileWriter {
    /// Open (or create) a log file, appending to any existing content
    ///
    /// The parent directory is created if absent. `max_bytes == 0` disables
    /// rotation.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::directory(parent, e))?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            state: Arc::new(Mutex::new(RotatingFile {
                path,
                file,
                size,
                max_bytes,
                backups,
            })),
        })
    }

    /// Path of the active log file
    pub fn path(&self) -> PathBuf {
        self.state
            .lock()
            .map(|state| state.path.clone())
            .unwrap_or_default()
    }
}

impl RotatingFile {
    fn should_rotate(&self, incoming: usize) -> bool {
        self.max_bytes > 0 && self.size > 0 && self.size + incoming as u64 >= self.max_bytes
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups > 0 {
            for index in (1..self.backups).rev() {
                let from = backup_path(&self.path, index);
                if from.exists() {
                    replace(&from, &backup_path(&self.path, index + 1))?;
                }
            }
            replace(&self.path, &backup_path(&self.path, 1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

/// `logs/upload.log` + 2 → `logs/upload.log.2`
fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn replace(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        fs::remove_file(to)?;
    }
    fs::rename(from, to)
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;

        if state.should_rotate(buf.len()) {
            state.rotate()?;
        }

        state.file.write_all(buf)?;
        state.size += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .file
            .flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
