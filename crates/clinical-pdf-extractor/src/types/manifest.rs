//! Provenance manifest types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::FileRecord;

/// Provenance record of one extraction run.
///
/// Built once after every other output is written and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// When the manifest was built (UTC)
    pub created_utc: DateTime<Utc>,
    /// Fingerprint of the input PDF
    pub input: FileRecord,
    /// Output directory as given by the caller
    pub output_dir: String,
    /// Text extraction backend identifier
    pub backend: String,
    /// Run options, passed through as-is
    pub args: BTreeMap<String, serde_json::Value>,
    /// Fingerprints of every output file still present, sorted by path
    pub outputs: Vec<FileRecord>,
    pub environment: EnvironmentInfo,
}

/// Host and dependency versions at run time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    /// Host platform description
    pub platform: String,
    /// Resolved package versions; unresolvable packages are absent
    pub packages: BTreeMap<String, String>,
}
