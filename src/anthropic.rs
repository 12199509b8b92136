/// Anthropic Messages API client module.
///
/// This module provides a blocking HTTP client for the Messages API, the
/// request/response wire types, and the trait seam used to stub the provider
/// in tests.
mod client;
pub mod types;

pub use client::{
    API_VERSION, AnthropicClient, AnthropicClientBuilder, AnthropicClientTrait, AnthropicError,
    DEFAULT_BASE_URL, DEFAULT_MODEL,
};
