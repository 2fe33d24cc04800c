//! Document, chunk and table types

use serde::{Deserialize, Serialize};

/// Text pulled out of a PDF together with the backend that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Raw extracted text (not yet cleaned)
    pub text: String,
    /// Backend identifier, recorded in outputs for traceability
    pub backend: String,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            backend: backend.into(),
        }
    }
}

/// One bounded slice of a document's cleaned text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Caller-supplied document identifier (usually the source filename)
    pub doc_id: String,
    /// `{doc_id}::{index:04}`
    pub chunk_id: String,
    /// Zero-based, dense position within the document
    pub chunk_index: usize,
    /// Start of the untrimmed span, in characters
    pub char_start: usize,
    /// End (exclusive) of the untrimmed span, in characters
    pub char_end: usize,
    /// Trimmed chunk content, never empty
    pub text: String,
}

impl Chunk {
    /// Separator between the document id and the chunk index
    pub const ID_SEPARATOR: &'static str = "::";

    /// Create a chunk, deriving its id from the document id and index
    pub fn new(
        doc_id: impl Into<String>,
        chunk_index: usize,
        char_start: usize,
        char_end: usize,
        text: impl Into<String>,
    ) -> Self {
        let doc_id = doc_id.into();
        Self {
            chunk_id: Self::make_id(&doc_id, chunk_index),
            doc_id,
            chunk_index,
            char_start,
            char_end,
            text: text.into(),
        }
    }

    /// Build a chunk id: doc id, separator, index zero-padded to four digits
    pub fn make_id(doc_id: &str, chunk_index: usize) -> String {
        format!("{}{}{:04}", doc_id, Self::ID_SEPARATOR, chunk_index)
    }

    /// Length of the source span in characters
    pub fn span_len(&self) -> usize {
        self.char_end - self.char_start
    }
}

/// Where a chunk's text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSource {
    /// Extraction backend identifier
    pub backend: String,
}

/// A chunk as persisted in `chunks.jsonl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub source: ChunkSource,
}

impl ChunkRecord {
    pub fn new(chunk: Chunk, backend: impl Into<String>) -> Self {
        Self {
            chunk,
            source: ChunkSource {
                backend: backend.into(),
            },
        }
    }
}

/// A rectangular table: a header row plus data rows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    /// 1-indexed page the table was found on
    pub page_number: u32,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from raw rows; the first row is the header.
    ///
    /// Returns `None` when there is no data row. Short rows are padded and
    /// missing header cells become empty strings so the grid is rectangular.
    pub fn from_rows(page_number: u32, rows: Vec<Vec<String>>) -> Option<Self> {
        if rows.len() < 2 {
            return None;
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut rows = rows.into_iter().map(|mut row| {
            row.resize(width, String::new());
            row
        });
        let header = rows.next()?;
        Some(Self {
            page_number,
            header,
            rows: rows.collect(),
        })
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.header.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_padding() {
        assert_eq!(Chunk::make_id("doc.pdf", 0), "doc.pdf::0000");
        assert_eq!(Chunk::make_id("doc.pdf", 42), "doc.pdf::0042");
        assert_eq!(Chunk::make_id("doc.pdf", 12345), "doc.pdf::12345");
    }

    #[test]
    fn test_chunk_record_json_shape() {
        let record = ChunkRecord::new(Chunk::new("x", 1, 3, 8, "héllo"), "pdf-extract");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["doc_id"], "x");
        assert_eq!(value["chunk_id"], "x::0001");
        assert_eq!(value["chunk_index"], 1);
        assert_eq!(value["char_start"], 3);
        assert_eq!(value["char_end"], 8);
        assert_eq!(value["text"], "héllo");
        assert_eq!(value["source"]["backend"], "pdf-extract");
    }

    #[test]
    fn test_table_from_rows() {
        let rows = vec![
            vec!["Drug".to_string(), "Dose".to_string()],
            vec!["Metformin".to_string()],
        ];
        let table = Table::from_rows(2, rows).unwrap();
        assert_eq!(table.header, vec!["Drug", "Dose"]);
        assert_eq!(table.rows, vec![vec!["Metformin".to_string(), String::new()]]);
        assert_eq!(table.width(), 2);

        assert!(Table::from_rows(1, vec![vec!["only header".to_string()]]).is_none());
        assert!(Table::from_rows(1, Vec::new()).is_none());
    }
}
