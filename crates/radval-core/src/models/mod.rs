//! Data models: extraction schema, ground truth, and configuration.

pub mod config;
pub mod ground_truth;
pub mod record;

pub use config::{Backend, RadvalConfig, RemoteConfig, ValidationConfig};
pub use ground_truth::{GroundTruthSize, StructuredGroundTruth};
pub use record::{ExtractionRecord, Finding, Laterality, Quadrant};
