//! Wire types for the Anthropic Messages API.
//!
//! Only the subset used for citation-enabled document questions is modeled.
//! Unknown response fields are ignored and unknown content block types
//! deserialize to [`ResponseBlock::Other`].

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Request content block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Document {
        source: DocumentSource,
        title: String,
        citations: CitationsConfig,
    },
    Text {
        text: String,
    },
}

/// Payload of a document block, either inline text or base64 binary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentSource {
    Text { media_type: String, data: String },
    Base64 { media_type: String, data: String },
}

impl DocumentSource {
    /// Returns the wire value of the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Base64 { .. } => "base64",
        }
    }

    pub fn media_type(&self) -> &str {
        match self {
            Self::Text { media_type, .. } | Self::Base64 { media_type, .. } => media_type,
        }
    }

    pub fn data(&self) -> &str {
        match self {
            Self::Text { data, .. } | Self::Base64 { data, .. } => data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CitationsConfig {
    pub enabled: bool,
}

/// Response body of `POST /v1/messages`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: Vec<ResponseBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// Response content block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text {
        text: String,
        #[serde(default)]
        citations: Option<Vec<WireCitation>>,
    },
    #[serde(other)]
    Other,
}

/// Citation annotation as sent by the provider.
///
/// Every field is optional on the wire; the location fields present depend
/// on `kind` (`char_location`, `page_location`, `content_block_location`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WireCitation {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub cited_text: Option<String>,
    #[serde(default)]
    pub document_index: Option<usize>,
    #[serde(default)]
    pub start_page_number: Option<usize>,
    #[serde(default)]
    pub end_page_number: Option<usize>,
    #[serde(default)]
    pub start_char_index: Option<usize>,
    #[serde(default)]
    pub end_char_index: Option<usize>,
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}
