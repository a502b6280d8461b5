use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::debug;

use super::KvsEngine;
use crate::common::VALUE_MAX;
use crate::Result;

/// A store that keeps every key as one file inside a directory.
///
/// The file is named exactly by the key and holds the raw value bytes,
/// with no metadata. Nothing is cached: the directory listing is the
/// whole database.
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    /// Opens a `FsStore` rooted at `dir`.
    ///
    /// The directory is not created; writes into a missing directory fail.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory holding the key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KvsEngine for FsStore {
    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let file = match File::open(self.key_path(key)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // One bounded read; anything past the buffer is never sent back.
        let mut content = Vec::new();
        file.take(VALUE_MAX as u64).read_to_end(&mut content)?;
        Ok(Some(content))
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Delete of missing key {:?}", key);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
