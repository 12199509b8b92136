/// Anthropic Messages API client implementation.
///
/// This module provides `AnthropicClient` for making synchronous HTTP requests to the
/// Messages API, along with error types and builder patterns for configuration.
use std::time::Duration;

use thiserror::Error;

use super::types::{ErrorEnvelope, MessageRequest, MessageResponse};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default model used when neither the engine builder nor `ANTHROPIC_MODEL` names one.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Value of the `anthropic-version` header.
pub const API_VERSION: &str = "2023-06-01";

/// Errors that can occur when interacting with the Anthropic API.
#[derive(Debug, Error)]
pub enum AnthropicError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code and no parseable error body
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Errors reported by the API in its error envelope
    #[error("Anthropic API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No API key was configured
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,
}

impl AnthropicError {
    /// Classifies a transport error from reqwest.
    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }

    /// Builds the error for a non-success response body.
    ///
    /// Uses the API's error envelope when present, otherwise falls back to
    /// a bare status error.
    fn from_error_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) if !envelope.error.message.is_empty() => Self::Api {
                status,
                message: if envelope.error.kind.is_empty() {
                    envelope.error.message
                } else {
                    format!("{}: {}", envelope.error.kind, envelope.error.message)
                },
            },
            _ => Self::Http { status },
        }
    }
}

/// Builder for constructing `AnthropicClient` instances.
///
/// # Examples
///
/// ```
/// use docqa::anthropic::AnthropicClientBuilder;
///
/// let client = AnthropicClientBuilder::new()
///     .api_key("sk-ant-test")
///     .base_url("http://localhost:8080")
///     .build()
///     .expect("Failed to create client");
///
/// assert_eq!(client.base_url(), "http://localhost:8080");
/// ```
#[derive(Debug, Default)]
pub struct AnthropicClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
}

impl AnthropicClientBuilder {
    /// Creates a new `AnthropicClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for the API (without the `/v1/messages` path).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builds the `AnthropicClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// Values not set on the builder fall back to `ANTHROPIC_BASE_URL` and
    /// `ANTHROPIC_API_KEY`, then to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `AnthropicError::MissingApiKey` if no non-empty key is available,
    /// or `AnthropicError::InvalidUrl` if the base URL does not parse.
    pub fn build(self) -> Result<AnthropicClient, AnthropicError> {
        let base_url = self
            .base_url
            .or_else(|| std::env::var("ANTHROPIC_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_key = self
            .api_key
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or(AnthropicError::MissingApiKey)?;

        reqwest::Url::parse(&base_url)
            .map_err(|e| AnthropicError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(AnthropicError::Network)?;

        Ok(AnthropicClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

/// Synchronous HTTP client for the Anthropic Messages API.
///
/// Construct it with `AnthropicClientBuilder`. Requests are sent once;
/// failures propagate to the caller without retry.
pub struct AnthropicClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

/// Trait for Messages API operations.
///
/// This trait enables mocking in unit tests and provides a clean interface
/// for the answer engine.
pub trait AnthropicClientTrait: Send + Sync {
    /// Sends a Messages API request and returns the decoded response.
    fn create_message(&self, request: &MessageRequest) -> Result<MessageResponse, AnthropicError>;
}

impl AnthropicClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the full URL of the messages endpoint.
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn create_message_internal(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, AnthropicError> {
        let url = self.messages_url();
        tracing::debug!(
            model = %request.model,
            blocks = request.messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "sending messages request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .map_err(AnthropicError::from_transport)?;

        let status = response.status();
        let body = response.text().map_err(AnthropicError::from_transport)?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "messages request failed");
            return Err(AnthropicError::from_error_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(AnthropicError::Serialization)
    }
}

impl AnthropicClientTrait for AnthropicClient {
    fn create_message(&self, request: &MessageRequest) -> Result<MessageResponse, AnthropicError> {
        self.create_message_internal(request)
    }
}
