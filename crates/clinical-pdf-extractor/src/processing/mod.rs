//! Run orchestration

mod pipeline;

pub use pipeline::{ExtractionPipeline, RunOptions, RunSummary};
