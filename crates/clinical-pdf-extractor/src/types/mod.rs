//! Core types for the extraction pipeline

pub mod document;
pub mod file_record;
pub mod manifest;

pub use document::{Chunk, ChunkRecord, ChunkSource, ExtractedText, Table};
pub use file_record::FileRecord;
pub use manifest::{EnvironmentInfo, Manifest};
