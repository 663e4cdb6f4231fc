//! Core library for radiology report validation.
//!
//! This crate provides:
//! - The extraction schema shared by all extractors
//! - A rule-based local extractor and a hosted-model (Bedrock) extractor
//! - A tolerance-aware comparator producing mismatch reports
//! - A row pipeline and CSV/JSON table I/O

pub mod compare;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod table;

pub use compare::{Comparator, Field, Mismatch, MismatchReport};
pub use error::{ExtractionError, RadvalError, RemoteError, Result, TableError};
pub use extract::{LocalHeuristicExtractor, ModelTransport, RemoteModelExtractor, ReportExtractor};
pub use models::config::{Backend, RadvalConfig, RemoteConfig};
pub use models::ground_truth::{GroundTruthSize, StructuredGroundTruth};
pub use models::record::{ExtractionRecord, Finding, Laterality, Quadrant};
pub use pipeline::{OutputRow, Pipeline, RunSummary, ValidationRun};

#[cfg(feature = "bedrock")]
pub use extract::remote::BedrockTransport;

/// Build the extractor selected by `config`.
pub fn build_extractor(config: &RadvalConfig) -> Box<dyn ReportExtractor> {
    match config.extraction.backend {
        Backend::Local => Box::new(LocalHeuristicExtractor::new()),
        Backend::Bedrock => Box::new(RemoteModelExtractor::from_config(config.remote.clone())),
    }
}
