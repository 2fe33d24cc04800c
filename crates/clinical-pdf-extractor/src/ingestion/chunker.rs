//! Fixed-size character chunking with overlap
//!
//! Offsets are measured in characters (Unicode scalar values) of the cleaned
//! text, never in bytes, so multi-byte text is never split inside a character.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkRecord};

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker.
    ///
    /// Fails with `InvalidArgument` unless `0 <= overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::invalid_argument("chunk_size must be > 0"));
        }
        if overlap >= chunk_size {
            return Err(Error::invalid_argument("chunk_overlap must be < chunk_size"));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into overlapping chunks.
    ///
    /// Windows that are blank after trimming are dropped without consuming an
    /// index, but still advance the cursor, so the untrimmed spans always
    /// cover the whole text.
    pub fn chunk(&self, text: &str, doc_id: &str) -> Vec<Chunk> {
        // Byte offset of every character, plus the end of the string
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let n = boundaries.len() - 1;

        let mut chunks = Vec::new();
        let mut chunk_index = 0usize;
        let mut start = 0usize;

        while start < n {
            let end = (start + self.chunk_size).min(n);
            let window = text[boundaries[start]..boundaries[end]].trim();

            if !window.is_empty() {
                chunks.push(Chunk::new(doc_id, chunk_index, start, end, window));
                chunk_index += 1;
            }

            if end == n {
                break;
            }
            start = end - self.overlap;
        }

        tracing::debug!(
            "Chunked '{}' ({} chars) into {} chunks (size={}, overlap={})",
            doc_id,
            n,
            chunks.len(),
            self.chunk_size,
            self.overlap
        );

        chunks
    }
}

/// Chunk `text` by character length with overlap.
pub fn chunk_text(
    text: &str,
    doc_id: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<Chunk>> {
    Ok(TextChunker::new(chunk_size, chunk_overlap)?.chunk(text, doc_id))
}

/// Write chunks as JSON Lines for embedding/RAG pipelines.
///
/// Each line carries the chunk fields plus `source.backend`. Non-ASCII text is
/// written as-is.
pub fn write_chunks_jsonl(path: &Path, chunks: &[Chunk], backend: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for chunk in chunks {
        let record = ChunkRecord::new(chunk.clone(), backend);
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a JSON Lines chunk file written by [`write_chunks_jsonl`].
pub fn read_chunks_jsonl(path: &Path) -> Result<Vec<ChunkRecord>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;

    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
