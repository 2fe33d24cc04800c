//! Clinical PDF extractor command-line interface
//!
//! Run with: cargo run -p clinical-pdf-extractor --bin cpe -- <PDF> --out out --chunks

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinical_pdf_extractor::config::ChunkingConfig;
use clinical_pdf_extractor::{ExtractionPipeline, ExtractorConfig, RunOptions};

#[derive(Debug, Parser)]
#[command(
    name = "cpe",
    version,
    about = "Clinical PDF extractor: cleaned text, tables, RAG-ready chunks and a provenance manifest"
)]
struct Cli {
    /// Path to a PDF
    pdf: PathBuf,

    /// Output folder
    #[arg(long, default_value = "out")]
    out: PathBuf,

    /// Also extract tables (requires poppler's pdftotext)
    #[arg(long)]
    tables: bool,

    /// Write RAG-ready chunks.jsonl from cleaned text
    #[arg(long)]
    chunks: bool,

    /// Chunk size in characters [default: 1500]
    #[arg(long, allow_negative_numbers = true)]
    chunk_size: Option<i64>,

    /// Chunk overlap in characters [default: 200]
    #[arg(long, allow_negative_numbers = true)]
    chunk_overlap: Option<i64>,

    /// Maximum consecutive line breaks kept in cleaned text [default: 2]
    #[arg(long)]
    max_blank_lines: Option<usize>,

    /// TOML configuration file; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Print a usage error and exit with status 2
fn usage_error(message: impl std::fmt::Display) -> ! {
    Cli::command().error(ErrorKind::ValueValidation, message).exit()
}

fn validate_pdf_path(pdf: &Path) {
    if !pdf.exists() {
        usage_error(format!("PDF file not found: {}", pdf.display()));
    }
    if pdf.is_dir() {
        usage_error(format!("PDF path is a directory, not a file: {}", pdf.display()));
    }
    let is_pdf = pdf
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        usage_error(format!("Expected a .pdf file, got: {}", pdf.display()));
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<ExtractorConfig> {
    let mut config = match &cli.config {
        Some(path) => ExtractorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExtractorConfig::default(),
    };

    if cli.chunk_size.is_some() || cli.chunk_overlap.is_some() {
        let size = cli.chunk_size.unwrap_or(config.chunking.chunk_size as i64);
        let overlap = cli.chunk_overlap.unwrap_or(config.chunking.chunk_overlap as i64);
        config.chunking =
            ChunkingConfig::from_signed(size, overlap).unwrap_or_else(|e| usage_error(e));
    }
    if let Some(max_blank_lines) = cli.max_blank_lines {
        config.cleaning.max_blank_lines = max_blank_lines;
    }

    if let Err(e) = config.validate() {
        usage_error(e);
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinical_pdf_extractor=info,cpe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    validate_pdf_path(&cli.pdf);
    let config = build_config(&cli)?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Chunk overlap: {}", config.chunking.chunk_overlap);
    tracing::info!("  - Max blank lines: {}", config.cleaning.max_blank_lines);

    let pipeline = ExtractionPipeline::new(config)?;
    let summary = pipeline
        .run(&RunOptions {
            pdf: cli.pdf.clone(),
            out: cli.out.clone(),
            tables: cli.tables,
            chunks: cli.chunks,
        })
        .with_context(|| format!("Extraction failed for {}", cli.pdf.display()))?;

    tracing::info!(
        "Backend {}: {} raw chars, {} clean chars",
        summary.backend,
        summary.raw_chars,
        summary.clean_chars
    );
    if let Some(count) = summary.chunk_count {
        tracing::info!("  - Chunks: {}", count);
    }
    if cli.tables {
        tracing::info!("  - Tables: {}", summary.table_files.len());
    }
    tracing::info!(
        "Manifest {} records {} outputs",
        summary.manifest_path.display(),
        summary.outputs_recorded
    );

    let shown = std::fs::canonicalize(&summary.output_dir).unwrap_or(summary.output_dir);
    println!("Wrote outputs to: {}", shown.display());

    Ok(())
}
