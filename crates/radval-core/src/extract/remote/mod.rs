//! Hosted language-model extraction.
//!
//! The extractor builds a two-part prompt, sends it through a
//! [`ModelTransport`], and parses the reply strictly into the extraction
//! schema. One request per report: no retries and no caching.

#[cfg(feature = "bedrock")]
pub mod bedrock;
pub mod prompt;
pub mod response;

#[cfg(feature = "bedrock")]
pub use bedrock::BedrockTransport;
pub use prompt::{build_extraction_prompt, SYSTEM_PROMPT};
pub use response::{parse_extraction, strip_code_fences};

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::config::RemoteConfig;
use crate::models::record::ExtractionRecord;

use super::{ReportExtractor, Result};

/// One prompt, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model_id: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Network client for a hosted model.
pub trait ModelTransport {
    /// Fail with [`ExtractionError::Configuration`] when the client cannot be used.
    fn ensure_available(&self) -> Result<()>;

    /// Send one request and return the model's text reply.
    fn converse(&self, request: &ModelRequest) -> Result<String>;
}

impl<T: ModelTransport + ?Sized> ModelTransport for Box<T> {
    fn ensure_available(&self) -> Result<()> {
        (**self).ensure_available()
    }

    fn converse(&self, request: &ModelRequest) -> Result<String> {
        (**self).converse(request)
    }
}

/// Stand-in used when the crate is built without a network client.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTransport;

impl ModelTransport for UnavailableTransport {
    fn ensure_available(&self) -> Result<()> {
        Err(ExtractionError::Configuration(
            "remote extraction requires the Bedrock client, which is not compiled in; \
             rebuild radval with `--features bedrock`"
                .to_string(),
        ))
    }

    fn converse(&self, _request: &ModelRequest) -> Result<String> {
        self.ensure_available().map(|_| String::new())
    }
}

/// The transport for `config`: Bedrock when compiled in, otherwise [`UnavailableTransport`].
pub fn default_transport(config: &RemoteConfig) -> Box<dyn ModelTransport> {
    #[cfg(feature = "bedrock")]
    {
        Box::new(BedrockTransport::from_config(config))
    }

    #[cfg(not(feature = "bedrock"))]
    {
        let _ = config;
        Box::new(UnavailableTransport)
    }
}

/// Extractor backed by a hosted language model.
pub struct RemoteModelExtractor<T: ModelTransport> {
    config: RemoteConfig,
    transport: T,
}

impl<T: ModelTransport> RemoteModelExtractor<T> {
    pub fn new(config: RemoteConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// The request that would be sent for `report_text`.
    pub fn build_request(&self, report_text: &str) -> ModelRequest {
        ModelRequest {
            model_id: self.config.model_id.clone(),
            system: SYSTEM_PROMPT.to_string(),
            user: build_extraction_prompt(report_text),
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        }
    }
}

impl RemoteModelExtractor<Box<dyn ModelTransport>> {
    /// Extractor using [`default_transport`].
    pub fn from_config(config: RemoteConfig) -> Self {
        let transport = default_transport(&config);
        Self::new(config, transport)
    }
}

impl<T: ModelTransport> ReportExtractor for RemoteModelExtractor<T> {
    fn name(&self) -> &str {
        "bedrock"
    }

    fn extract(&self, report_text: &str) -> Result<ExtractionRecord> {
        self.transport.ensure_available()?;
        self.config.validate()?;

        let request = self.build_request(report_text);
        debug!(
            model = %request.model_id,
            prompt_chars = request.user.len(),
            "Sending extraction request"
        );

        let reply = self.transport.converse(&request)?;
        debug!(reply_chars = reply.len(), "Received extraction reply");

        parse_extraction(&reply)
    }
}
