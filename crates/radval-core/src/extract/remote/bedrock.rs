//! Amazon Bedrock Converse API transport.
//!
//! Authenticates with a Bedrock API key sent as a bearer token.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExtractionError, RemoteError};
use crate::extract::Result;
use crate::models::config::RemoteConfig;

use super::{ModelRequest, ModelTransport};

/// Environment variable holding the Bedrock API key.
pub const ENV_API_KEY: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// Blocking HTTP client for the Converse endpoint.
pub struct BedrockTransport {
    endpoint: String,
    api_key: Option<String>,
    client: std::result::Result<reqwest::blocking::Client, String>,
    timeout_secs: Option<u64>,
}

impl BedrockTransport {
    /// Transport for `config`, reading the API key from the environment.
    pub fn from_config(config: &RemoteConfig) -> Self {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Self {
            endpoint: config.endpoint_url(),
            api_key: std::env::var(ENV_API_KEY).ok().filter(|k| !k.trim().is_empty()),
            client: builder.build().map_err(|e| e.to_string()),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Use an explicit API key instead of the environment.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Converse URL for a model. The model id stays one path segment, so a
    /// `/` inside an ARN or inference profile id is encoded.
    pub fn converse_url(&self, model_id: &str) -> Result<Url> {
        let invalid = || {
            ExtractionError::Configuration(format!("invalid Bedrock endpoint URL: {}", self.endpoint))
        };

        let mut url = Url::parse(&self.endpoint).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["model", model_id, "converse"]);
        Ok(url)
    }

    fn client_and_key(&self) -> Result<(&reqwest::blocking::Client, &str)> {
        let client = self.client.as_ref().map_err(|e| {
            ExtractionError::Configuration(format!("cannot initialize the Bedrock HTTP client: {e}"))
        })?;
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ExtractionError::Configuration(format!(
                "no Bedrock API key found; export {ENV_API_KEY} or use the local backend"
            ))
        })?;
        Ok((client, api_key))
    }

    fn map_send_error(&self, e: reqwest::Error) -> RemoteError {
        if e.is_connect() {
            RemoteError::Connection(self.endpoint.clone())
        } else if e.is_timeout() {
            RemoteError::Timeout(match self.timeout_secs {
                Some(secs) => format!("no response after {secs}s"),
                None => e.to_string(),
            })
        } else {
            RemoteError::Http(e.to_string())
        }
    }
}

impl ModelTransport for BedrockTransport {
    fn ensure_available(&self) -> Result<()> {
        self.client_and_key().map(|_| ())
    }

    fn converse(&self, request: &ModelRequest) -> Result<String> {
        let (client, api_key) = self.client_and_key()?;

        let url = self.converse_url(&request.model_id)?;
        debug!(%url, "POST converse");

        let response = client
            .post(url)
            .bearer_auth(api_key)
            .json(&ConverseRequest::from(request))
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        parse_converse_response(&body)
    }
}

/// Request body of the Converse API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConverseRequest<'a> {
    system: Vec<TextBlock<'a>>,
    messages: Vec<Message<'a>>,
    inference_config: InferenceConfig,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<TextBlock<'a>>,
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    temperature: f32,
    max_tokens: u32,
}

impl<'a> From<&'a ModelRequest> for ConverseRequest<'a> {
    fn from(request: &'a ModelRequest) -> Self {
        Self {
            system: vec![TextBlock {
                text: &request.system,
            }],
            messages: vec![Message {
                role: "user",
                content: vec![TextBlock {
                    text: &request.user,
                }],
            }],
            inference_config: InferenceConfig {
                temperature: request.temperature,
                max_tokens: request.max_output_tokens,
            },
        }
    }
}

/// Response body of the Converse API (only the parts we read).
#[derive(Debug, Deserialize)]
struct ConverseResponse {
    output: ConverseOutput,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ConverseOutput {
    message: OutputMessage,
}

#[derive(Debug, Deserialize)]
struct OutputMessage {
    content: Vec<OutputBlock>,
}

#[derive(Debug, Deserialize)]
struct OutputBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

/// Pull the first text block out of a Converse response body.
pub(crate) fn parse_converse_response(body: &str) -> Result<String> {
    let response: ConverseResponse = serde_json::from_str(body)
        .map_err(|e| ExtractionError::parse(format!("unexpected Converse response: {e}"), body))?;

    if let Some(usage) = &response.usage {
        debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Converse token usage"
        );
    }

    response
        .output
        .message
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| ExtractionError::parse("Converse response has no text content", body))
}
