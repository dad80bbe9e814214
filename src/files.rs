use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{RhttpError, Result};

/// Writes `bytes` to `path`, creating parent directories and replacing any existing file.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    write_checked(&mut file, path, bytes)
}

/// Creates `path` (failing if it exists) and writes `bytes` into it.
pub fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    write_checked(&mut file, path, bytes)
}

fn write_checked(file: &mut File, path: &Path, bytes: &[u8]) -> Result<()> {
    file.write_all(bytes)?;
    file.sync_all()?;

    let written = usize::try_from(file.metadata()?.len()).unwrap_or(usize::MAX);
    if written != bytes.len() {
        return Err(RhttpError::PartialWrite {
            path: path.to_path_buf(),
            written,
            expected: bytes.len(),
        });
    }
    Ok(())
}
