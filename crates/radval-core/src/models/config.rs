//! Configuration structures for the validation pipeline.

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Environment variable overriding [`RemoteConfig::region`].
pub const ENV_REGION: &str = "BEDROCK_REGION";
/// Environment variable overriding [`RemoteConfig::model_id`].
pub const ENV_MODEL_ID: &str = "BEDROCK_MODEL_ID";
/// Environment variable overriding [`RemoteConfig::endpoint`].
pub const ENV_ENDPOINT: &str = "RADVAL_BEDROCK_ENDPOINT";

/// Default size tolerance in millimetres.
pub const DEFAULT_SIZE_TOLERANCE_MM: f64 = 1.0;

/// Main configuration for radval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RadvalConfig {
    /// Extractor selection.
    pub extraction: ExtractionConfig,

    /// Hosted model settings (used by the Bedrock backend).
    pub remote: RemoteConfig,

    /// Comparison settings.
    pub validation: ValidationConfig,
}

/// Which extractor produces structured values from report text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Rule-based extraction, no external dependency.
    #[default]
    Local,
    /// Hosted language model through the Bedrock Converse API.
    Bedrock,
}

/// Extractor selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub backend: Backend,
}

/// Hosted model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Cloud region hosting the model endpoint.
    pub region: String,

    /// Model identifier passed to the Converse API.
    pub model_id: String,

    /// Sampling temperature (0.0 - 1.0).
    pub temperature: f32,

    /// Response length cap in tokens.
    pub max_output_tokens: u32,

    /// Endpoint base URL; derived from the region when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// HTTP timeout in seconds. No timeout when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            model_id: "amazon.nova-pro-v1:0".to_string(),
            temperature: 0.0,
            max_output_tokens: 512,
            endpoint: None,
            timeout_secs: None,
        }
    }
}

impl RemoteConfig {
    /// Check the settings before any request is attempted.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if self.region.trim().is_empty() {
            return Err(ExtractionError::Configuration(
                "remote region is empty; set BEDROCK_REGION or --region".to_string(),
            ));
        }
        if self.model_id.trim().is_empty() {
            return Err(ExtractionError::Configuration(
                "remote model id is empty; set BEDROCK_MODEL_ID or --model-id".to_string(),
            ));
        }
        if !self.temperature.is_finite() || !(0.0..=1.0).contains(&self.temperature) {
            return Err(ExtractionError::Configuration(format!(
                "temperature must be within [0, 1], got {}",
                self.temperature
            )));
        }
        if self.max_output_tokens == 0 {
            return Err(ExtractionError::Configuration(
                "max_output_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL of the runtime endpoint.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }
}

/// Comparison configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Allowed absolute size difference in millimetres.
    pub size_tolerance_mm: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            size_tolerance_mm: DEFAULT_SIZE_TOLERANCE_MM,
        }
    }
}

impl RadvalConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Apply `BEDROCK_REGION`, `BEDROCK_MODEL_ID` and `RADVAL_BEDROCK_ENDPOINT`
    /// from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(region) = non_empty(ENV_REGION) {
            self.remote.region = region;
        }
        if let Some(model_id) = non_empty(ENV_MODEL_ID) {
            self.remote.model_id = model_id;
        }
        if let Some(endpoint) = non_empty(ENV_ENDPOINT) {
            self.remote.endpoint = Some(endpoint);
        }
    }
}
