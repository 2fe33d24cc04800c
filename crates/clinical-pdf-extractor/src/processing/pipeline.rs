//! End-to-end extraction run: extract, clean, chunk, write, record provenance

use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::ingestion::{
    extract_text, write_chunks_jsonl, write_tables_csv, LayoutTableExtractor, PdfTextExtractor,
    TableExtractor, TextChunker, TextCleaner, TextExtractor,
};
use crate::provenance::{write_manifest, ManifestRequest, ProvenanceRecorder};

/// What to do in one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Input PDF
    pub pdf: PathBuf,
    /// Output directory (created if absent)
    pub out: PathBuf,
    /// Also extract tables to CSV
    pub tables: bool,
    /// Also write `chunks.jsonl`
    pub chunks: bool,
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub backend: String,
    /// Characters in the raw extracted text
    pub raw_chars: usize,
    /// Characters in the cleaned text
    pub clean_chars: usize,
    /// Number of chunks written, when chunking was requested
    pub chunk_count: Option<usize>,
    pub table_files: Vec<PathBuf>,
    pub manifest_path: PathBuf,
    /// Output files recorded in the manifest
    pub outputs_recorded: usize,
}

/// Extraction pipeline with pluggable backends
pub struct ExtractionPipeline {
    config: ExtractorConfig,
    cleaner: TextCleaner,
    chunker: TextChunker,
    text_extractor: Box<dyn TextExtractor>,
    table_extractor: Box<dyn TableExtractor>,
    recorder: ProvenanceRecorder,
}

impl ExtractionPipeline {
    /// Create a pipeline with the default PDF backends.
    ///
    /// Fails with `InvalidArgument` if the configuration is out of range, so
    /// bad chunking parameters are rejected before any file is touched.
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cleaner: TextCleaner::from_config(&config.cleaning)?,
            chunker: TextChunker::from_config(&config.chunking)?,
            text_extractor: Box::new(PdfTextExtractor::new()),
            table_extractor: Box::new(LayoutTableExtractor::new()),
            recorder: ProvenanceRecorder::new(config.provenance.clone()),
            config,
        })
    }

    /// Replace the text extraction backend
    pub fn with_text_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.text_extractor = extractor;
        self
    }

    /// Replace the table extraction backend
    pub fn with_table_extractor(mut self, extractor: Box<dyn TableExtractor>) -> Self {
        self.table_extractor = extractor;
        self
    }

    /// Replace the provenance recorder (clock and environment probe)
    pub fn with_recorder(mut self, recorder: ProvenanceRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run the whole pipeline. The manifest is written last so it can
    /// fingerprint every other output.
    pub fn run(&self, options: &RunOptions) -> Result<RunSummary> {
        let out = options.out.as_path();
        let names = &self.config.output;

        let extracted = extract_text(self.text_extractor.as_ref(), &options.pdf)?;
        std::fs::create_dir_all(out)?;

        let clean = self.cleaner.clean(&extracted.text);

        let chunk_count = if options.chunks {
            let doc_id = doc_id_for(&options.pdf);
            let chunks = self.chunker.chunk(&clean, &doc_id);
            write_chunks_jsonl(&out.join(&names.chunks), &chunks, &extracted.backend)?;
            tracing::info!("Wrote {} chunks for {}", chunks.len(), doc_id);
            Some(chunks.len())
        } else {
            None
        };

        std::fs::write(out.join(&names.raw_text), &extracted.text)?;
        std::fs::write(out.join(&names.clean_text), &clean)?;
        std::fs::write(out.join(&names.backend), &extracted.backend)?;

        let table_files = if options.tables {
            let tables = self.table_extractor.extract_tables(&options.pdf)?;
            write_tables_csv(out, &names.table_prefix, &tables)?
        } else {
            Vec::new()
        };

        let manifest = self.recorder.build_manifest(ManifestRequest {
            input_pdf: &options.pdf,
            output_dir: out,
            backend: &extracted.backend,
            args: self.manifest_args(options),
            extra_outputs: Vec::new(),
        })?;
        let manifest_path = out.join(&names.manifest);
        write_manifest(&manifest_path, &manifest)?;

        Ok(RunSummary {
            output_dir: out.to_path_buf(),
            backend: extracted.backend,
            raw_chars: extracted.text.chars().count(),
            clean_chars: clean.chars().count(),
            chunk_count,
            table_files,
            manifest_path,
            outputs_recorded: manifest.outputs.len(),
        })
    }

    fn manifest_args(&self, options: &RunOptions) -> BTreeMap<String, serde_json::Value> {
        let mut args = BTreeMap::new();
        args.insert("pdf".to_string(), json!(options.pdf.display().to_string()));
        args.insert("out".to_string(), json!(options.out.display().to_string()));
        args.insert("tables".to_string(), json!(options.tables));
        args.insert("chunks".to_string(), json!(options.chunks));
        args.insert("chunk_size".to_string(), json!(self.chunker.chunk_size()));
        args.insert("chunk_overlap".to_string(), json!(self.chunker.overlap()));
        args.insert(
            "max_blank_lines".to_string(),
            json!(self.cleaner.max_blank_lines()),
        );
        args
    }
}

/// Document id used for chunk ids: the input file name
fn doc_id_for(pdf: &Path) -> String {
    pdf.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| pdf.display().to_string())
}
