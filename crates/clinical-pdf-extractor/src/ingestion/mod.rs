//! Document ingestion: extraction, cleaning and chunking

pub mod chunker;
pub mod cleaner;
mod parser;
mod tables;

pub use chunker::{chunk_text, read_chunks_jsonl, write_chunks_jsonl, TextChunker};
pub use cleaner::{
    clean_extracted_text, collapse_blank_lines, collapse_inline_whitespace,
    fix_hyphenation_linebreaks, normalize_newlines, normalize_unicode_whitespace, TextCleaner,
};
pub use parser::{
    ensure_input_file, extract_text, PdfTextExtractor, TextExtractor, LOPDF_BACKEND,
    PDF_EXTRACT_BACKEND,
};
pub use tables::{
    parse_layout_tables, write_table_csv, write_tables_csv, LayoutTableExtractor, TableExtractor,
};
