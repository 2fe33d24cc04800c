//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractorConfig {
    /// Text cleaning configuration
    #[serde(default)]
    pub cleaning: CleaningConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Provenance configuration
    #[serde(default)]
    pub provenance: ProvenanceConfig,
    /// Output file naming
    #[serde(default)]
    pub output: OutputConfig,
}

impl ExtractorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for out-of-range values
    pub fn validate(&self) -> Result<()> {
        self.cleaning.validate()?;
        self.chunking.validate()?;
        self.provenance.validate()
    }
}

/// Text cleaning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Max number of consecutive line feeds kept (must be >= 1)
    pub max_blank_lines: usize,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self { max_blank_lines: 2 }
    }
}

impl CleaningConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_blank_lines < 1 {
            return Err(Error::invalid_argument("max_blank_lines must be >= 1"));
        }
        Ok(())
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 200,
        }
    }
}

impl ChunkingConfig {
    /// Build from signed values as they arrive from the command line.
    ///
    /// Negative values are rejected here so the rest of the chunker can work
    /// with `usize` offsets.
    pub fn from_signed(chunk_size: i64, chunk_overlap: i64) -> Result<Self> {
        if chunk_size <= 0 {
            return Err(Error::invalid_argument("chunk_size must be > 0"));
        }
        if chunk_overlap < 0 {
            return Err(Error::invalid_argument("chunk_overlap must be >= 0"));
        }
        let config = Self {
            chunk_size: usize::try_from(chunk_size)
                .map_err(|_| Error::invalid_argument("chunk_size is too large"))?,
            chunk_overlap: usize::try_from(chunk_overlap)
                .map_err(|_| Error::invalid_argument("chunk_overlap is too large"))?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::invalid_argument("chunk_size must be > 0"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::invalid_argument("chunk_overlap must be < chunk_size"));
        }
        Ok(())
    }
}

/// Provenance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvenanceConfig {
    /// Block size used when streaming files through SHA-256 (default: 1MB)
    pub hash_block_size: usize,
    /// Packages whose versions are recorded in the manifest environment
    pub packages: Vec<String>,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            hash_block_size: 1024 * 1024, // 1MB
            packages: vec![
                env!("CARGO_PKG_NAME").to_string(),
                "pdftotext".to_string(),
            ],
        }
    }
}

impl ProvenanceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hash_block_size == 0 {
            return Err(Error::invalid_argument("hash_block_size must be > 0"));
        }
        Ok(())
    }
}

/// Names of the files written into the output directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub raw_text: PathBuf,
    pub clean_text: PathBuf,
    pub backend: PathBuf,
    pub chunks: PathBuf,
    pub manifest: PathBuf,
    /// Prefix for per-table CSV files (`{prefix}_{n:03}.csv`)
    pub table_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_text: PathBuf::from("text_raw.txt"),
            clean_text: PathBuf::from("text.txt"),
            backend: PathBuf::from("backend.txt"),
            chunks: PathBuf::from("chunks.jsonl"),
            manifest: PathBuf::from("manifest.json"),
            table_prefix: "table".to_string(),
        }
    }
}
