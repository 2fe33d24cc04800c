//! Streaming SHA-256 file fingerprints

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::FileRecord;

/// Default read block size for hashing (1MB)
pub const DEFAULT_HASH_BLOCK_SIZE: usize = 1024 * 1024;

fn open_file(path: &Path) -> Result<File> {
    let metadata = std::fs::metadata(path).map_err(|_| Error::NotFound(path.to_path_buf()))?;
    if metadata.is_dir() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }
    File::open(path).map_err(|_| Error::NotFound(path.to_path_buf()))
}

/// Hex SHA-256 of a file, read in blocks of `block_size` bytes
pub fn sha256_file(path: &Path, block_size: usize) -> Result<String> {
    let (digest, _) = hash_file(path, block_size)?;
    Ok(digest)
}

/// Fingerprint a file: hex SHA-256, byte length and path string.
///
/// Fails with `NotFound` if the file is missing or cannot be opened.
pub fn fingerprint_file(path: &Path, block_size: usize) -> Result<FileRecord> {
    let (digest, bytes) = hash_file(path, block_size)?;
    Ok(FileRecord::new(path.display().to_string(), digest, bytes))
}

fn hash_file(path: &Path, block_size: usize) -> Result<(String, u64)> {
    if block_size == 0 {
        return Err(Error::invalid_argument("hash block size must be > 0"));
    }

    let mut file = open_file(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; block_size];
    let mut total = 0u64;

    loop {
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        };
        hasher.update(&buffer[..read]);
        total += read as u64;
    }

    Ok((hex::encode(hasher.finalize()), total))
}
