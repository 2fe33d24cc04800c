//! clinical-pdf-extractor: PDF text and table extraction with provenance
//!
//! Extracted text goes through a conservative cleaning pipeline, can be split
//! into overlapping RAG-ready chunks, and every run is described by a manifest
//! holding SHA-256 fingerprints of the input and all outputs.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod provenance;
pub mod types;

pub use config::ExtractorConfig;
pub use error::{Error, Result};
pub use ingestion::{chunk_text, clean_extracted_text, extract_text};
pub use processing::{ExtractionPipeline, RunOptions, RunSummary};
pub use types::{Chunk, ExtractedText, FileRecord, Manifest, Table};
