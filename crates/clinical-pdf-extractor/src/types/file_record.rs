//! File fingerprint records

use serde::{Deserialize, Serialize};

/// Integrity fingerprint of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path as given (not canonicalized)
    pub path: String,
    /// Lowercase hex SHA-256 of the full file contents
    pub sha256: String,
    /// File size in bytes
    pub bytes: u64,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, sha256: impl Into<String>, bytes: u64) -> Self {
        Self {
            path: path.into(),
            sha256: sha256.into(),
            bytes,
        }
    }
}
